pub mod math;
pub mod rgb;
pub mod config;
pub mod timer;
pub mod hit_objects;
pub mod judgement;
pub mod broadcast;
pub mod mods;
pub mod timeline;
pub mod skin_ini;
pub mod skin_manager;
pub mod circle_piece;
pub mod beatmap;
pub mod osu_input;
pub mod processor;
