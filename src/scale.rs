// 📏 Chart Scales
// Band and linear scales for the speed chart: categorical bands with
// proportional padding, and a linear scale with round ("nice") domain
// extension and round tick values.

const E10: f64 = 7.071067811865476; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)

// ============================================================================
// BAND SCALE
// ============================================================================

/// Categorical band scale.
///
/// One band per unique name, in first-occurrence order; `padding` is the
/// proportional gap between bands (and at both ends). Duplicate names
/// collapse into a single band, so two records sharing a name share an x
/// position and the last-drawn bar wins visually.
#[derive(Debug, Clone)]
pub struct BandScale {
    names: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new<I, S>(names: I, range_start: f64, range_end: f64, padding: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !unique.iter().any(|n| n == name) {
                unique.push(name.to_string());
            }
        }

        let n = unique.len() as f64;
        let span = range_end - range_start;
        // padding applies between bands and at both outer edges
        let step = span / (n - padding + padding * 2.0).max(1.0);
        let bandwidth = step * (1.0 - padding);
        let start = range_start + (span - step * (n - padding)) * 0.5;

        BandScale {
            names: unique,
            start,
            step,
            bandwidth,
        }
    }

    /// Left edge of the band for `name`; None for names outside the domain.
    pub fn position(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.start + self.step * i as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Band names in domain order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

// ============================================================================
// LINEAR SCALE
// ============================================================================

/// Linear scale mapping [d0, d1] onto [r0, r1]. The range may be inverted
/// (r0 > r1), which is how the chart maps larger speeds to higher rows.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(d0: f64, d1: f64, r0: f64, r1: f64) -> Self {
        LinearScale { d0, d1, r0, r1 }
    }

    /// Extend the domain outward to round values sized for `count` ticks.
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = (self.d0.min(self.d1), self.d0.max(self.d1));
        let mut prestep = f64::NAN;

        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if step == prestep {
                break;
            } else if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            prestep = step;
        }

        if self.d0 <= self.d1 {
            self.d0 = start;
            self.d1 = stop;
        } else {
            self.d0 = stop;
            self.d1 = start;
        }
        self
    }

    /// Map a domain value into the range.
    pub fn scale(&self, v: f64) -> f64 {
        let span = self.d1 - self.d0;
        if span == 0.0 {
            // degenerate domain maps everything to the range midpoint
            return (self.r0 + self.r1) / 2.0;
        }
        let t = (v - self.d0) / span;
        self.r0 + t * (self.r1 - self.r0)
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.d0, self.d1)
    }

    /// Round tick values covering the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.d0.min(self.d1), self.d0.max(self.d1), count)
    }
}

/// Tick step for ~count ticks over [start, stop]; 1/2/5 times a power of
/// ten. A negative return encodes the reciprocal of a sub-unit step.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / (count.max(1) as f64);
    if step <= 0.0 || !step.is_finite() {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Round values in [start, stop] at the tick increment for `count`.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let step = tick_increment(start, stop, count);
    if step == 0.0 || !step.is_finite() {
        return Vec::new();
    }

    if step > 0.0 {
        let mut r0 = (start / step).round();
        let mut r1 = (stop / step).round();
        if r0 * step < start {
            r0 += 1.0;
        }
        if r1 * step > stop {
            r1 -= 1.0;
        }
        (r0 as i64..=r1 as i64).map(|i| i as f64 * step).collect()
    } else {
        let step = -step;
        let mut r0 = (start * step).round();
        let mut r1 = (stop * step).round();
        if r0 / step < start {
            r0 += 1.0;
        }
        if r1 / step > stop {
            r1 -= 1.0;
        }
        (r0 as i64..=r1 as i64).map(|i| i as f64 / step).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_band_scale_positions_in_caller_order() {
        let scale = BandScale::new(["a", "b", "c"], 0.0, 100.0, 0.0);

        // zero padding: three equal bands
        assert_close(scale.bandwidth(), 100.0 / 3.0);
        assert_close(scale.position("a").unwrap(), 0.0);
        assert_close(scale.position("b").unwrap(), 100.0 / 3.0);
        assert_close(scale.position("c").unwrap(), 200.0 / 3.0);
        assert_eq!(scale.position("d"), None);
    }

    #[test]
    fn test_band_scale_padding_shrinks_bands() {
        let padded = BandScale::new(["a", "b"], 0.0, 100.0, 0.15);
        let unpadded = BandScale::new(["a", "b"], 0.0, 100.0, 0.0);

        assert!(padded.bandwidth() < unpadded.bandwidth());
        // bands stay inside the range
        let last = padded.position("b").unwrap() + padded.bandwidth();
        assert!(last <= 100.0 + 1e-9);
        assert!(padded.position("a").unwrap() >= 0.0);
    }

    #[test]
    fn test_band_scale_duplicate_names_collapse() {
        let scale = BandScale::new(["a", "b", "a"], 0.0, 90.0, 0.0);

        assert_eq!(scale.names().len(), 2);
        // the duplicate maps onto the first occurrence's band
        assert_close(scale.position("a").unwrap(), 0.0);
    }

    #[test]
    fn test_band_scale_single_name() {
        let scale = BandScale::new(["only"], 0.0, 50.0, 0.15);

        let x = scale.position("only").unwrap();
        assert!(x >= 0.0 && x + scale.bandwidth() <= 50.0 + 1e-9);
    }

    #[test]
    fn test_linear_scale_maps_and_inverts() {
        let scale = LinearScale::new(0.0, 100.0, 320.0, 70.0);

        assert_close(scale.scale(0.0), 320.0);
        assert_close(scale.scale(100.0), 70.0);
        assert_close(scale.scale(50.0), 195.0);
    }

    #[test]
    fn test_linear_scale_nice_extends_to_round_values() {
        let scale = LinearScale::new(0.0, 97.0, 0.0, 1.0).nice(8);
        assert_eq!(scale.domain(), (0.0, 100.0));

        let scale = LinearScale::new(0.0, 120.0, 0.0, 1.0).nice(8);
        assert_eq!(scale.domain(), (0.0, 120.0)); // already round

        let scale = LinearScale::new(0.0, 0.913, 0.0, 1.0).nice(8);
        let (_, hi) = scale.domain();
        assert!(hi >= 0.913 && hi < 1.0 + 1e-9);
    }

    #[test]
    fn test_linear_scale_degenerate_domain() {
        let scale = LinearScale::new(0.0, 0.0, 10.0, 20.0);
        assert_close(scale.scale(0.0), 15.0);
        assert_eq!(scale.ticks(8), vec![0.0]);
    }

    #[test]
    fn test_ticks_are_round_and_cover_domain() {
        let values = ticks(0.0, 120.0, 8);

        assert_eq!(values.first(), Some(&0.0));
        assert_eq!(values.last(), Some(&120.0));
        for pair in values.windows(2) {
            assert_close(pair[1] - pair[0], 20.0);
        }
    }

    #[test]
    fn test_ticks_subunit_domain() {
        let values = ticks(0.0, 1.0, 8);

        assert!(values.len() >= 5);
        assert_eq!(values[0], 0.0);
        assert_close(*values.last().unwrap(), 1.0);
    }
}
