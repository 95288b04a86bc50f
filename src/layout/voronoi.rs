// Nearest-site partition of a rectangle. Each cell starts as the full
// rectangle and is clipped by the bisector against every site that can
// still reach it. Sites are visited outward in x order so the scan stops
// once the horizontal gap alone exceeds twice the cell radius.

use std::collections::HashSet;

use super::geometry::{Bounds, Point, clip_to_bisector, distance, polygon_area};

const MIN_CELL_AREA: f32 = 1e-6;

/// One polygon per site, `None` where the site owns no area: a later
/// duplicate of an earlier site, a non-finite site, or a site whose cell
/// clips away entirely.
pub fn voronoi_cells(sites: &[Point], bounds: Bounds) -> Vec<Option<Vec<Point>>> {
    let finite = |p: Point| p.0.is_finite() && p.1.is_finite();

    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut duplicate = vec![false; sites.len()];
    for (idx, &site) in sites.iter().enumerate() {
        if !finite(site) {
            continue;
        }
        // `+ 0.0` folds -0.0 into 0.0 so both share a key.
        let key = ((site.0 + 0.0).to_bits(), (site.1 + 0.0).to_bits());
        if !seen.insert(key) {
            duplicate[idx] = true;
        }
    }

    let mut order: Vec<usize> = (0..sites.len())
        .filter(|&idx| finite(sites[idx]) && !duplicate[idx])
        .collect();
    order.sort_by(|&a, &b| sites[a].0.total_cmp(&sites[b].0));
    let mut rank = vec![usize::MAX; sites.len()];
    for (pos, &idx) in order.iter().enumerate() {
        rank[idx] = pos;
    }

    sites
        .iter()
        .enumerate()
        .map(|(idx, &site)| {
            if rank[idx] == usize::MAX {
                return None;
            }
            site_cell(site, rank[idx], &order, sites, bounds)
        })
        .collect()
}

fn site_cell(
    site: Point,
    pos: usize,
    order: &[usize],
    sites: &[Point],
    bounds: Bounds,
) -> Option<Vec<Point>> {
    let mut cell = bounds.to_polygon();
    let mut radius = cell_radius(&cell, site);
    let mut left = pos.checked_sub(1);
    let mut right = pos + 1;

    loop {
        let dl = left.map(|l| site.0 - sites[order[l]].0);
        let dr = (right < order.len()).then(|| sites[order[right]].0 - site.0);
        let (gap, other) = match (dl, dr) {
            (Some(dl), Some(dr)) if dl <= dr => (dl, take_left(&mut left, order)),
            (Some(dl), None) => (dl, take_left(&mut left, order)),
            (_, Some(dr)) => {
                let other = order[right];
                right += 1;
                (dr, other)
            }
            (None, None) => break,
        };
        if gap >= 2.0 * radius {
            break;
        }
        let other = sites[other];
        if distance(site, other) >= 2.0 * radius {
            continue;
        }
        cell = clip_to_bisector(&cell, site, other);
        if cell.len() < 3 {
            return None;
        }
        radius = cell_radius(&cell, site);
    }

    (polygon_area(&cell).abs() > MIN_CELL_AREA).then_some(cell)
}

fn take_left(left: &mut Option<usize>, order: &[usize]) -> usize {
    let current = left.unwrap_or(0);
    *left = current.checked_sub(1);
    order[current]
}

/// Distance from the site to the farthest cell vertex.
fn cell_radius(cell: &[Point], site: Point) -> f32 {
    cell.iter()
        .map(|&vertex| distance(vertex, site))
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::polygon_contains;

    fn lcg(seed: &mut u64) -> f32 {
        *seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((*seed >> 40) as f32) / ((1u64 << 24) as f32)
    }

    #[test]
    fn two_sites_split_the_rectangle() {
        let cells = voronoi_cells(&[(25.0, 50.0), (75.0, 50.0)], Bounds::from_size(100.0, 100.0));
        let left = cells[0].as_ref().unwrap();
        let right = cells[1].as_ref().unwrap();
        assert!((polygon_area(left).abs() - 5000.0).abs() < 1e-2);
        assert!((polygon_area(right).abs() - 5000.0).abs() < 1e-2);
    }

    #[test]
    fn single_site_owns_everything() {
        let bounds = Bounds::from_size(40.0, 30.0).inflate(1.0);
        let cells = voronoi_cells(&[(10.0, 10.0)], bounds);
        let cell = cells[0].as_ref().unwrap();
        assert!((polygon_area(cell).abs() - bounds.area()).abs() < 1e-3);
    }

    #[test]
    fn coincident_sites_keep_first() {
        let cells = voronoi_cells(
            &[(10.0, 10.0), (50.0, 50.0), (10.0, 10.0)],
            Bounds::from_size(100.0, 100.0),
        );
        assert!(cells[0].is_some());
        assert!(cells[1].is_some());
        assert!(cells[2].is_none());
    }

    #[test]
    fn all_coincident_sites_leave_one_cell() {
        let cells = voronoi_cells(&[(5.0, 5.0); 4], Bounds::from_size(10.0, 10.0));
        assert_eq!(cells.iter().filter(|c| c.is_some()).count(), 1);
    }

    #[test]
    fn site_far_outside_bounds_gets_no_cell() {
        let cells = voronoi_cells(&[(50.0, 50.0), (500.0, 50.0)], Bounds::from_size(100.0, 100.0));
        assert!(cells[0].is_some());
        assert!(cells[1].is_none());
    }

    #[test]
    fn non_finite_sites_get_no_cell() {
        let cells = voronoi_cells(&[(f32::NAN, 1.0), (5.0, 5.0)], Bounds::from_size(10.0, 10.0));
        assert!(cells[0].is_none());
        assert!(cells[1].is_some());
    }

    #[test]
    fn cells_partition_random_samples() {
        let mut seed = 7u64;
        let bounds = Bounds::from_size(300.0, 200.0).inflate(1.0);
        let sites: Vec<Point> = (0..40)
            .map(|_| (lcg(&mut seed) * 300.0, lcg(&mut seed) * 200.0))
            .collect();
        let cells = voronoi_cells(&sites, bounds);
        let total: f32 = cells.iter().flatten().map(|c| polygon_area(c).abs()).sum();
        assert!((total - bounds.area()).abs() / bounds.area() < 1e-3);

        for _ in 0..500 {
            let p = (
                bounds.min_x + (0.001 + 0.998 * lcg(&mut seed)) * bounds.width(),
                bounds.min_y + (0.001 + 0.998 * lcg(&mut seed)) * bounds.height(),
            );
            let mut by_distance: Vec<(usize, f32)> = sites
                .iter()
                .enumerate()
                .map(|(idx, &site)| (idx, distance(site, p)))
                .collect();
            by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
            // samples sitting on a cell edge are ambiguous at f32 precision
            if by_distance[1].1 - by_distance[0].1 < 1e-2 {
                continue;
            }
            let owners: Vec<usize> = cells
                .iter()
                .enumerate()
                .filter_map(|(idx, c)| c.as_ref().filter(|c| polygon_contains(c, p)).map(|_| idx))
                .collect();
            assert_eq!(owners, vec![by_distance[0].0], "sample {p:?}");
        }
    }
}
