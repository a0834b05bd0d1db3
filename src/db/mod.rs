//! Database module for SQLite persistence using SeaORM

pub mod entities;

use std::path::Path;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// Initialize database connection and create tables
pub async fn init_database(db_path: &Path) -> Result<DatabaseConnection, DbErr> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    tracing::info!("Connecting to database: {}", db_url);

    let db = Database::connect(&db_url).await?;

    // Create tables
    create_tables(&db).await?;

    Ok(db)
}

/// Create all tables if they don't exist
async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Accounts table; role stays NULL until selected on first login
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            first_name TEXT,
            last_name TEXT,
            role TEXT,
            phone_number TEXT,
            blood_type TEXT,
            medical_condition TEXT,
            address TEXT,
            emergency_contact TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)"#.to_string(),
    ))
    .await?;

    // Organ requests table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS organ_requests (
            id TEXT PRIMARY KEY,
            patient_id TEXT NOT NULL,
            organ_type TEXT NOT NULL,
            priority TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            medical_reason TEXT NOT NULL,
            doctor_notes TEXT,
            rejection_reason TEXT,
            approved_by TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (patient_id) REFERENCES users(id),
            FOREIGN KEY (approved_by) REFERENCES users(id)
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_requests_patient ON organ_requests(patient_id)"#
            .to_string(),
    ))
    .await?;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_requests_status ON organ_requests(status)"#.to_string(),
    ))
    .await?;

    // Organ pledges table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS organ_pledges (
            id TEXT PRIMARY KEY,
            donor_id TEXT NOT NULL,
            organ_type TEXT NOT NULL,
            donation_type TEXT NOT NULL,
            is_available INTEGER NOT NULL DEFAULT 1,
            medical_notes TEXT,
            approved_by TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (donor_id) REFERENCES users(id),
            FOREIGN KEY (approved_by) REFERENCES users(id)
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_pledges_donor ON organ_pledges(donor_id)"#.to_string(),
    ))
    .await?;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_pledges_available ON organ_pledges(is_available)"#
            .to_string(),
    ))
    .await?;

    // Organ matches table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS organ_matches (
            id TEXT PRIMARY KEY,
            request_id TEXT NOT NULL,
            pledge_id TEXT NOT NULL,
            compatibility_score INTEGER,
            doctor_id TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            recommended_by TEXT,
            approved_by TEXT,
            notes TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (request_id) REFERENCES organ_requests(id),
            FOREIGN KEY (pledge_id) REFERENCES organ_pledges(id),
            FOREIGN KEY (doctor_id) REFERENCES users(id)
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_matches_status ON organ_matches(status)"#.to_string(),
    ))
    .await?;

    // Medical records table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS medical_records (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            record_type TEXT NOT NULL,
            description TEXT NOT NULL,
            results TEXT,
            doctor_id TEXT,
            attachments TEXT,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id),
            FOREIGN KEY (doctor_id) REFERENCES users(id)
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_records_user ON medical_records(user_id)"#.to_string(),
    ))
    .await?;

    tracing::info!("Database tables initialized");
    Ok(())
}
