mod bezier;
mod particles;
mod sequencer;
mod viewport;

pub(crate) use bezier::{CubicBezier, FlowPath, Point, QuadBezier};
pub(crate) use particles::{opacity_of, position_of, ParticleStream};
pub(crate) use sequencer::{compute_timeline, flow_dot_timeline, Timeline};
pub(crate) use viewport::{visible_fraction, RevealObserver};
