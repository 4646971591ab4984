// Library root: the story builder game engine and the room slot that owns it.

pub mod config;
pub mod game;
pub mod room;
