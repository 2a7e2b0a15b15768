pub use sea_orm_migration::prelude::*;

mod m20251101_000001_eve_character;
mod m20251101_000002_auth_user;
mod m20251101_000003_auth_state;
mod m20251101_000004_auth_group;
mod m20251101_000005_discord_user;
mod m20251101_000006_teamspeak3;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000001_eve_character::Migration),
            Box::new(m20251101_000002_auth_user::Migration),
            Box::new(m20251101_000003_auth_state::Migration),
            Box::new(m20251101_000004_auth_group::Migration),
            Box::new(m20251101_000005_discord_user::Migration),
            Box::new(m20251101_000006_teamspeak3::Migration),
        ]
    }
}
