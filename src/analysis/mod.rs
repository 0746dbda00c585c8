// src/analysis/mod.rs
//
// Signal flow:
//   LandmarkFrame → signal (angles / ankle & hip heights) ─┬→ detection::PushupCounter
//                                                          └→ calibration → detection::JumpDetector

pub mod calibration;
pub mod signal;
