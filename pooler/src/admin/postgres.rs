use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use config::shared::{AdminConnectionConfig, IntoConnectOptions};
use tokio::sync::Mutex;
use tokio_postgres::tls::MakeTlsConnect;
use tokio_postgres::{Client, Config, Connection, NoTls, Socket};
use tracing::{Instrument, debug, error, info};

use crate::admin::{AdminConnection, AdminConnectionProvider};
use crate::bail;
use crate::error::{ErrorKind, PoolerError, PoolerResult};

/// Spawns a background task driving an admin connection until it terminates.
fn spawn_admin_connection<T>(database: String, connection: Connection<Socket, T::Stream>)
where
    T: MakeTlsConnect<Socket>,
    T::Stream: Send + 'static,
{
    let span = tracing::Span::current();
    let task = async move {
        match connection.await {
            Err(err) => error!(%database, "admin connection to the pooler failed: {}", err),
            Ok(()) => info!(%database, "admin connection to the pooler terminated"),
        }
    }
    .instrument(span);

    // Dropping the cached `Client` ends the connection, so the handle is not tracked.
    tokio::spawn(task);
}

#[derive(Debug)]
struct PoolInner {
    config: AdminConnectionConfig,
    clients: Mutex<HashMap<String, Arc<Client>>>,
    closed: AtomicBool,
}

/// [`AdminConnectionProvider`] backed by tokio-postgres.
///
/// Handles are created without touching the network. The first statement executed for a
/// database opens a connection that is cached and shared by later handles until it closes,
/// so a pooler that is still starting surfaces as a failed execution rather than a failed
/// acquisition.
#[derive(Debug, Clone)]
pub struct PgAdminConnectionPool {
    inner: Arc<PoolInner>,
}

impl PgAdminConnectionPool {
    /// Creates a pool connecting with `config`.
    pub fn new(config: AdminConnectionConfig) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                config,
                clients: Mutex::new(HashMap::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Returns `true` once [`PgAdminConnectionPool::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Drops every cached connection and refuses new handles.
    pub async fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        let dropped = {
            let mut clients = self.inner.clients.lock().await;
            let count = clients.len();
            clients.clear();
            count
        };

        info!(dropped, "admin connection pool closed");
    }

    /// Returns the cached client for `database`, connecting when none is usable.
    async fn client(&self, database: &str) -> PoolerResult<Arc<Client>> {
        // Handles may outlive `close`; a closed pool never dials the socket.
        if self.is_closed() {
            bail!(
                ErrorKind::AdminConnectionUnavailable,
                "Admin connection pool is closed",
                database
            );
        }

        {
            let clients = self.inner.clients.lock().await;
            if let Some(client) = clients.get(database).filter(|client| !client.is_closed()) {
                return Ok(client.clone());
            }
        }

        let options: Config = self.inner.config.with_database(database);
        let (client, connection) = options.connect(NoTls).await?;
        spawn_admin_connection::<NoTls>(database.to_owned(), connection);

        debug!(
            database,
            socket_dir = %self.inner.config.socket_dir,
            port = self.inner.config.port,
            "connected to the pooler admin console"
        );

        let client = Arc::new(client);
        let mut clients = self.inner.clients.lock().await;
        if self.is_closed() {
            bail!(
                ErrorKind::AdminConnectionUnavailable,
                "Admin connection pool closed while connecting",
                database
            );
        }
        clients.insert(database.to_owned(), client.clone());

        Ok(client)
    }

    /// Removes `client` from the cache unless it was already replaced.
    async fn evict(&self, database: &str, client: &Arc<Client>) {
        let mut clients = self.inner.clients.lock().await;
        if clients
            .get(database)
            .is_some_and(|cached| Arc::ptr_eq(cached, client))
        {
            clients.remove(database);
            debug!(database, "evicted broken admin connection");
        }
    }
}

impl AdminConnectionProvider for PgAdminConnectionPool {
    type Connection = PgAdminConnection;

    async fn connection(&self, database: &str) -> PoolerResult<PgAdminConnection> {
        if self.is_closed() {
            bail!(
                ErrorKind::AdminConnectionUnavailable,
                "Admin connection pool is closed",
                database
            );
        }

        if database.trim().is_empty() {
            bail!(
                ErrorKind::AdminConnectionUnavailable,
                "Admin database name is empty"
            );
        }

        Ok(PgAdminConnection {
            pool: self.clone(),
            database: database.to_owned(),
        })
    }
}

/// Handle on one control database of a [`PgAdminConnectionPool`].
#[derive(Debug, Clone)]
pub struct PgAdminConnection {
    pool: PgAdminConnectionPool,
    database: String,
}

impl PgAdminConnection {
    /// Returns the control database this handle targets.
    pub fn database(&self) -> &str {
        &self.database
    }
}

impl AdminConnection for PgAdminConnection {
    async fn execute(&self, command: &str) -> PoolerResult<()> {
        let client = self.pool.client(&self.database).await?;

        // The console only speaks the simple query protocol.
        if let Err(err) = client.batch_execute(command).await {
            let err = PoolerError::from(err);
            if err.kind().is_not_ready() {
                self.pool.evict(&self.database, &client).await;
            }

            return Err(err);
        }

        Ok(())
    }
}
