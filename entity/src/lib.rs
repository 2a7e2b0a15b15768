//! SeaORM entities for the Bifrost sync database.

pub mod prelude;

pub mod auth_group;
pub mod auth_group_permission;
pub mod auth_state;
pub mod auth_state_member_alliance;
pub mod auth_state_member_character;
pub mod auth_state_member_corporation;
pub mod auth_state_permission;
pub mod auth_user;
pub mod auth_user_group;
pub mod discord_user;
pub mod eve_character;
pub mod teamspeak3_group_mapping;
pub mod teamspeak3_state_group;
pub mod teamspeak3_user;
