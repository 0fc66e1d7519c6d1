//! Scene assembly scenarios
