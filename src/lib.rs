//! Host process for a field-scouting rover: drives a snake coverage path
//! over a mock or Robonect-backed drive train, captures photos at path
//! milestones, and exposes a small operator API.

pub mod actuator;
pub mod camera;
pub mod config;
pub mod mission;
pub mod web;
