use num::traits::{Float, FloatConst};

/// removes 2π jumps between consecutive phase samples (numpy `unwrap` rules)
pub fn unwrap_phase<T>(phase: &[T]) -> Vec<T>
where
    T: Float + FloatConst,
{
    let two_pi = T::PI() + T::PI();
    let mut result = Vec::with_capacity(phase.len());
    let mut correction = T::zero();
    for (i, &p) in phase.iter().enumerate() {
        if i > 0 {
            let d = p - phase[i - 1];
            let shifted = d + T::PI();
            let mut dmod = shifted - two_pi * (shifted / two_pi).floor() - T::PI();
            if dmod == -T::PI() && d > T::zero() {
                dmod = T::PI();
            }
            if d.abs() >= T::PI() {
                correction = correction + dmod - d;
            }
        }
        result.push(p + correction);
    }
    result
}

/// unit-spacing gradient, central differences inside and one-sided at the ends
pub fn gradient<T>(y: &[T]) -> Vec<T>
where
    T: Float,
{
    let n = y.len();
    if n < 2 {
        return vec![T::zero(); n];
    }
    let two = T::one() + T::one();
    (0..n)
        .map(|i| {
            if i == 0 {
                y[1] - y[0]
            } else if i == n - 1 {
                y[n - 1] - y[n - 2]
            } else {
                (y[i + 1] - y[i - 1]) / two
            }
        })
        .collect()
}

pub fn deg2rad<T>(deg: T) -> T
where
    T: Float + FloatConst,
{
    deg * T::PI() / T::from(180).unwrap()
}

pub fn rad2deg<T>(rad: T) -> T
where
    T: Float + FloatConst,
{
    rad * T::from(180).unwrap() / T::PI()
}
