//! Staff command - role changes from the command line.

use crate::cli::args::{StaffAction, StaffArgs};
use crate::config::Config;
use crate::domain::Role;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::Services;

/// Execute the staff command
pub async fn execute(args: StaffArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let services = Services::from_connection(db.get_connection(), &config);

    let (username, role) = match args.action {
        StaffAction::Promote { username } => (username, Role::Employee),
        StaffAction::Demote { username } => (username, Role::Client),
    };

    let account = services.accounts.change_role(username, role).await?;

    println!(
        "{} is now {}",
        account.user.username,
        account.profile.role
    );
    Ok(())
}
