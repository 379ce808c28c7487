//! # leap_tinsel
//!
//! Hand-gesture controlled particle Christmas tree.  Thousands of particles
//! assemble into a spiral tree with a ribbon and ornaments, scatter into
//! falling snow on command, and a pinched hand fans a photo gallery out in
//! front of the camera.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Open palm | Scatter the tree into snow |
//! | Closed fist | Reassemble the tree |
//! | Pinch (held, 500 ms grace) | Open the photo gallery fan |
//! | Hand gone / other pose | Close the gallery once the grace runs out |
//!
//! Mode changes are debounced (300 ms) and every structural change starts
//! a 2 s cooldown; see [`tinsel_mode::GestureModeMachine`].
//!
//! ## Visualization
//!
//! A software-rendered perspective view: additive particle sprites, the
//! star above the tree, the "MERRY CHRISTMAS" sign while it snows, the
//! gallery cards and a status line.
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**, held keys stand in for the hand.
//! * `leap`: **Hardware mode**, classifies a real LeapMotion hand via LeapC.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Gesture / control |
//! |---|---|
//! | `O` / hold | Open palm |
//! | `F` / hold | Closed fist |
//! | `P` / hold | Pinch |
//! | `X` / hold | Other pose |
//! | `M` | Toggle Tree/Snow directly |
//! | `G` | Start/stop the gesture feed |
//! | `C` | Next particle colour |
//! | `S` | Next particle shape |
//! | `Up` / `Down` | Particle size |
//! | `A` | Add a photo |
//! | `Backspace` | Clear photos |
//! | `Q` / `Escape` | Quit |

pub mod classifier;
pub mod config;
pub mod controls;
pub mod error;
pub mod gesture;
pub mod scene;
pub mod sprite;
pub mod visualizer;
pub mod app;
