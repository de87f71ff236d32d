//! Seeded 2D gradient noise for organic displacement

/// Gradient noise at `(x, y)`, roughly in `[-1, 1]` and exactly zero on integer lattice points.
///
/// Corner gradients come from a hashed integer lattice keyed by `seed`; corners are blended
/// with smoothstep weights.
pub fn noise2(x: f64, y: f64, seed: i32) -> f64 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let ix = x0 as i32;
    let iy = y0 as i32;

    let n00 = gradient(lattice_hash(ix, iy, seed), fx, fy);
    let n10 = gradient(lattice_hash(ix.wrapping_add(1), iy, seed), fx - 1.0, fy);
    let n01 = gradient(lattice_hash(ix, iy.wrapping_add(1), seed), fx, fy - 1.0);
    let n11 = gradient(lattice_hash(ix.wrapping_add(1), iy.wrapping_add(1), seed), fx - 1.0, fy - 1.0);

    let u = smoothstep(fx);
    let v = smoothstep(fy);
    let top = n00 + (n10 - n00) * u;
    let bottom = n01 + (n11 - n01) * u;
    top + (bottom - top) * v
}

/// Fractal sum of `octaves` noise layers, each at double frequency and half amplitude
pub fn fbm2(x: f64, y: f64, seed: i32, octaves: u32) -> f64 {
    let mut sum = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut norm = 0.0;
    for octave in 0..octaves.max(1) {
        sum += amplitude * noise2(x * frequency, y * frequency, seed.wrapping_add(octave as i32));
        norm += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    sum / norm
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn lattice_hash(ix: i32, iy: i32, seed: i32) -> u32 {
    let mut h = (ix as u32).wrapping_mul(374_761_393)
        ^ (iy as u32).wrapping_mul(668_265_263)
        ^ (seed as u32).wrapping_mul(2_654_435_761);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^ (h >> 16)
}

/// Picks one of four diagonal gradients, one sign bit per axis
fn gradient(hash: u32, x: f64, y: f64) -> f64 {
    let gx = if hash & 1 == 0 { x } else { -x };
    let gy = if hash & 2 == 0 { y } else { -y };
    (gx + gy) * 0.5
}
