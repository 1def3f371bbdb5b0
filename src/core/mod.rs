pub mod action;
pub mod blink;
pub mod config;
pub mod engine;
pub mod expression;
pub mod figure;
pub mod history;
pub mod lipsync;
pub mod motion;
pub mod prefs;
pub mod scene;
pub mod texture;
pub mod timer;
