//! Reserved directive names understood by every hive.

/// Plain acknowledgement; also the directive of every auto-reply.
pub const REPLY: &str = "reply";

/// A message an actor sends to itself to reschedule its own continuation.
pub const SELF_REPLY: &str = "self_reply";

/// Reply emitted when a message's recipient could not be found.
pub const ERROR_NO_SUCH_ACTOR: &str = "error.no_such_actor";

/// Declare the sender as the ambassador for a remote hive.
pub const REGISTER_AMBASSADOR: &str = "register_ambassador";

/// Withdraw a previously registered ambassador.
pub const UNREGISTER_AMBASSADOR: &str = "unregister_ambassador";

/// Ask a hive to construct an actor from a registered actor type.
pub const CREATE_ACTOR: &str = "create_actor";

/// Carry a message destined for another hive to its ambassador.
pub const FORWARD_MESSAGE: &str = "forward_message";

/// Ask a peer hive to register its end of a bridge as an ambassador.
pub const CONNECT_BACK: &str = "connect_back";

/// First step of the two-step remote shutdown handshake.
pub const REMOTE_SHUTDOWN: &str = "remote_shutdown";

/// Second step of the handshake; actually stops the peer's loop.
pub const REMOTE_SHUTDOWN_STEP2: &str = "remote_shutdown_step2";

/// Delivers the output of an awaited future back to the awaiting actor.
pub const FUTURE_REPLY: &str = "future_reply";
