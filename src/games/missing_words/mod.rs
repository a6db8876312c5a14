//! The "Missing Words" game: observe the cards, the curtain drops, some cards
//! vanish, name the missing ones.

pub mod hiding;
pub mod layout;
pub mod round;
