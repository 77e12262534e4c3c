//! Event log migrations, embedded at build time
//!
//! Each entry is `(file name, sql)`. The first entry creates the
//! `sys_migrations` bookkeeping table and runs on every open; the rest run
//! once, in order. A new migration gets the next `NNN_` prefix.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
