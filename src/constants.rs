use num::traits::Float;

pub fn light_speed<T: Float>() -> T {
    T::from(2.99792458e8).unwrap()
}

/// effective index of refraction of the firn/ice around the trigger antennas
pub fn refr_index<T: Float>() -> T {
    T::from(1.75).unwrap()
}

pub const SAMPLE_RATE: f64 = 1e9;

pub const NS_PER_S: f64 = 1e9;

/// the reference deployment, in processing order
pub const STATIONS: [u32; 8] = [24, 23, 22, 21, 14, 13, 12, 11];
