mod concurrency_test;
mod pause_test;
mod pg_admin_test;
mod resume_test;
