/* "Draws" a route progressively over a fixed duration.

The shell owns the frame loop: it calls `RouteAnimator::on_frame` once per
display refresh for as long as it returns true. Starting a new animation
replaces the running one, and the handle returned by `start` can cancel it
early. A stale handle never cancels a newer animation.
*/
use std::time::{Duration, Instant};

use geo_types::Coord;
use geojson::Position;

use crate::route_geometry::coord_is_finite;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u64);

struct RunningAnimation {
    handle: AnimationHandle,
    coords: Vec<Coord<f64>>,
    started_at: Instant,
    duration: Duration,
}

pub struct RouteAnimator {
    frame: Option<RunningAnimation>,
    next_id: u64,
}

/// Keeps the well formed `[lng, lat]` pairs.
pub fn valid_coords(coords: &[Position]) -> Vec<Coord<f64>> {
    coords
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| Coord { x: p[0], y: p[1] })
        .filter(coord_is_finite)
        .collect()
}

/// The polyline drawn so far: every vertex already reached plus the
/// interpolated head.
pub fn partial_route(coords: &[Coord<f64>], progress: f64) -> Vec<Coord<f64>> {
    if coords.len() < 2 {
        return coords.to_vec();
    }
    let progress = if progress.is_nan() {
        0.
    } else {
        progress.clamp(0., 1.)
    };
    let last = coords.len() - 1;
    let float_idx = progress * last as f64;
    let idx = float_idx.floor() as usize;
    if idx >= last {
        return coords.to_vec();
    }
    let frac = float_idx - idx as f64;
    let (a, b) = (coords[idx], coords[idx + 1]);
    let head = Coord {
        x: a.x + (b.x - a.x) * frac,
        y: a.y + (b.y - a.y) * frac,
    };
    let mut partial = coords[..=idx].to_vec();
    partial.push(head);
    partial
}

impl RouteAnimator {
    pub fn new() -> Self {
        RouteAnimator {
            frame: None,
            next_id: 0,
        }
    }

    /// With fewer than 2 usable coordinates the animated line is cleared
    /// right away and nothing is scheduled.
    pub fn start<F>(
        &mut self,
        coords: &[Position],
        duration: Duration,
        now: Instant,
        mut set_state: F,
    ) -> Option<AnimationHandle>
    where
        F: FnMut(Option<Vec<Coord<f64>>>),
    {
        if let Some(previous) = self.frame.take() {
            debug!("route animation {:?} preempted", previous.handle);
        }

        let coords = valid_coords(coords);
        if coords.len() < 2 {
            set_state(None);
            return None;
        }

        let handle = AnimationHandle(self.next_id);
        self.next_id += 1;
        self.frame = Some(RunningAnimation {
            handle,
            coords,
            started_at: now,
            duration,
        });
        Some(handle)
    }

    /// Publishes the line for this frame. Returns whether another frame is
    /// needed.
    pub fn on_frame<F>(&mut self, now: Instant, mut set_state: F) -> bool
    where
        F: FnMut(Option<Vec<Coord<f64>>>),
    {
        let animation = match &self.frame {
            Some(animation) => animation,
            None => return false,
        };
        let progress = if animation.duration.is_zero() {
            1.
        } else {
            now.saturating_duration_since(animation.started_at)
                .as_secs_f64()
                / animation.duration.as_secs_f64()
        };
        set_state(Some(partial_route(&animation.coords, progress)));
        if progress >= 1. {
            self.frame = None;
            return false;
        }
        true
    }

    pub fn cancel(&mut self, handle: AnimationHandle) -> bool {
        match &self.frame {
            Some(animation) if animation.handle == handle => {
                self.frame = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    pub fn current(&self) -> Option<AnimationHandle> {
        self.frame.as_ref().map(|animation| animation.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn interpolates_the_head() {
        let coords = [c(0., 0.), c(0., 1.), c(0., 2.)];
        assert_eq!(
            partial_route(&coords, 0.25),
            vec![c(0., 0.), c(0., 0.5)]
        );
        assert_eq!(
            partial_route(&coords, 0.75),
            vec![c(0., 0.), c(0., 1.), c(0., 1.5)]
        );
        assert_eq!(partial_route(&coords, 1.), coords.to_vec());
        assert_eq!(partial_route(&coords, 7.), coords.to_vec());
    }

    #[test]
    fn malformed_pairs_are_dropped() {
        let coords = vec![vec![0., 0.], vec![1.], vec![f64::NAN, 1.], vec![2., 2., 9.]];
        assert_eq!(valid_coords(&coords), vec![c(0., 0.), c(2., 2.)]);
    }
}
