//! Arc distance and decay scoring, computed the way the search engine does.
//!
//! Stored geo-points are quantized to 32-bit integers per axis before any
//! distance is taken, and the haversine term has its lowest mantissa bits
//! cleared. Both steps are reproduced so in-process results match what the
//! engine reports for the same documents.

const EARTH_MEAN_RADIUS_M: f64 = 6_371_008.771_4;

/// One international mile in meters. The decay scale is always one mile.
pub const METERS_PER_MILE: f64 = 1_609.344;

/// Score at a distance of one `scale` from the origin.
const DECAY_AT_SCALE: f64 = 0.5;

const LAT_DECODE: f64 = 180.0 / 4_294_967_296.0;
const LON_DECODE: f64 = 360.0 / 4_294_967_296.0;

/// Rounds a latitude down onto the engine's 32-bit point grid.
#[must_use]
pub fn quantize_latitude(latitude: f64) -> f64 {
    // `as i32` saturates, which matches the engine nudging 90.0 just below the pole.
    #[allow(clippy::cast_possible_truncation)]
    let encoded = (latitude / LAT_DECODE).floor() as i32;
    f64::from(encoded) * LAT_DECODE
}

/// Rounds a longitude down onto the engine's 32-bit point grid.
#[must_use]
pub fn quantize_longitude(longitude: f64) -> f64 {
    #[allow(clippy::cast_possible_truncation)]
    let encoded = (longitude / LON_DECODE).floor() as i32;
    f64::from(encoded) * LON_DECODE
}

/// Great-circle distance in meters between two points given in degrees.
#[must_use]
pub fn arc_distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let x1 = lat1.to_radians();
    let x2 = lat2.to_radians();
    let h1 = 1.0 - (x1 - x2).cos();
    let h2 = 1.0 - (lon1 - lon2).to_radians().cos();
    let h = h1 + x1.cos() * x2.cos() * h2;
    // Low three bits are dropped so near-equal distances do not produce spurious ordering.
    let h = f64::from_bits(h.to_bits() & !0x7);
    EARTH_MEAN_RADIUS_M * 2.0 * (h * 0.5).sqrt().min(1.0).asin()
}

/// Gaussian decay: 1.0 at the origin, [`DECAY_AT_SCALE`] at `scale_m`.
#[must_use]
pub fn gauss_decay(distance_m: f64, scale_m: f64) -> f64 {
    // Negative: ln(0.5) < 0.
    let spread = 0.5 * scale_m * scale_m / DECAY_AT_SCALE.ln();
    (0.5 * distance_m * distance_m / spread).exp()
}
