pub mod oauth;
pub mod role_sync;

pub const DISCORD_API_BASE: &str = "https://discord.com/api";
pub const DISCORD_CDN_BASE: &str = "https://cdn.discordapp.com";
