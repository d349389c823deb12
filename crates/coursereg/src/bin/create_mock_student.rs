//! Seeds the database with a student account for manual testing.
//!
//! Usage: `create_mock_student [name] [email]`

use anyhow::Context;
use tracing::{error, info};

use coursereg::catalog::{self, NewStudent, Role};
use coursereg::config::ServerConfig;
use coursereg::db::RegistrationDb;
use coursereg::logging;

fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load(None)?;
    logging::init(config.tracing_level()?);

    let mut args = std::env::args().skip(1);
    let student = NewStudent {
        role: Role::Student,
        name: args.next().unwrap_or_else(|| "Test Student".to_string()),
        email: args
            .next()
            .unwrap_or_else(|| "test.student@example.com".to_string()),
    };

    let db = RegistrationDb::open(&config.database_path).with_context(|| {
        format!(
            "failed to open database at {}",
            config.database_path.display()
        )
    })?;

    match catalog::create_student(&db, student) {
        Ok(student) => {
            info!(id = student.id, email = %student.email, "Mock student created");
            println!("{}", student.id);
            Ok(())
        }
        Err(e) => {
            error!("Error creating user: {}", e);
            Err(e).context("failed to create mock student")
        }
    }
}
