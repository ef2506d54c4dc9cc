//! Wire format types for provider-specific API protocols
//!
//! Each module contains plain serde structs matching the respective
//! provider's JSON format. Only the shapes the gateway builds itself are
//! modelled; upstream responses are relayed without being decoded into
//! these types.

pub mod anthropic;
pub mod google;
pub mod openai;
