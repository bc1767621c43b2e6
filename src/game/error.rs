/// Rejections raised by game commands and menu callbacks.
///
/// None of these are fatal.  The `Display` text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("No active game! Start one with `game public` or `game private`.")]
    NoActiveSession,
    #[error("A game is already active in this server!")]
    AlreadyActive,
    #[error("The game has already started!")]
    AlreadyStarted,
    #[error("No active game stage to continue.")]
    NotStarted,
    #[error("Only the host can do that!")]
    NotHost,
    #[error("This is not your menu!")]
    NotYourMenu,
    #[error("It is not your turn!")]
    NotYourTurn,
    #[error("You are already in the team!")]
    AlreadyJoined,
    #[error("❌ Player not found in game.")]
    PlayerNotFound,
    #[error("❌ Invalid stat type. Available stats: Str, Int, Def, Dex")]
    InvalidStat,
    #[error("❌ Invalid class. Available classes: warrior, archer, mage, priest")]
    InvalidClass,
    #[error("❌ Not enough available stat points.")]
    InsufficientStatPoints,
    #[error("❌ You don't have enough gold! ({have}g)")]
    InsufficientGold { have: u64 },
    #[error("❌ Only an admin can do that in a public game, and only the host in a private one.")]
    UnauthorizedVisibilityAction,
    #[error("The host cannot leave. End the game instead.")]
    HostCannotLeave,
    /// A control posted by an earlier game in this server
    #[error("This menu is no longer available.")]
    StaleMenu,
}
