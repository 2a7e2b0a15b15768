pub use super::auth_group::Entity as AuthGroup;
pub use super::auth_group_permission::Entity as AuthGroupPermission;
pub use super::auth_state::Entity as AuthState;
pub use super::auth_state_member_alliance::Entity as AuthStateMemberAlliance;
pub use super::auth_state_member_character::Entity as AuthStateMemberCharacter;
pub use super::auth_state_member_corporation::Entity as AuthStateMemberCorporation;
pub use super::auth_state_permission::Entity as AuthStatePermission;
pub use super::auth_user::Entity as AuthUser;
pub use super::auth_user_group::Entity as AuthUserGroup;
pub use super::discord_user::Entity as DiscordUser;
pub use super::eve_character::Entity as EveCharacter;
pub use super::teamspeak3_group_mapping::Entity as Teamspeak3GroupMapping;
pub use super::teamspeak3_state_group::Entity as Teamspeak3StateGroup;
pub use super::teamspeak3_user::Entity as Teamspeak3User;
