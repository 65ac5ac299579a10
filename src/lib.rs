#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate lazy_static;

pub mod api;
pub mod circuit_progress;
pub mod config;
pub mod geo_utils;
pub mod gps_trace;
pub mod logs;
pub mod navigation;
pub mod osrm;
pub mod route_animation;
pub mod route_geometry;
pub mod user;
pub mod zone;
