//! Directional names for groups.
//!
//! # Rules
//!
//! - K = 4: the highest-latitude centroid is "North", the lowest "South";
//!   of the remaining two the lower longitude is "West", the other "East".
//!   If north and south coincide the groups are named by ascending
//!   longitude as West, South, North, East.
//! - K = 1: "Central".
//! - K = 2: North/South or West/East, along the axis where the centroids
//!   are further apart.
//! - Otherwise: the eight-wind bearing of each centroid as seen from the
//!   mean centroid. Repeated names get a numeric suffix.

use std::collections::HashMap;

use log::warn;

use crate::models::{Entity, GeoPoint, Partition};

const NORTH: &str = "North";
const SOUTH: &str = "South";
const WEST: &str = "West";
const EAST: &str = "East";
const CENTRAL: &str = "Central";

const WINDS: [&str; 8] = [
    "North",
    "Northeast",
    "East",
    "Southeast",
    "South",
    "Southwest",
    "West",
    "Northwest",
];

/// Names every group of `partition` by the position of its centroid.
///
/// Returns one name per group, indexed by group.
///
/// # Examples
///
/// ```
/// use u_grouping::evaluation::compass_names;
/// use u_grouping::models::{Entity, Partition};
///
/// let entities = vec![
///     Entity::new("kiel", 54.32, 10.13),
///     Entity::new("munich", 48.14, 11.58),
///     Entity::new("cologne", 50.94, 6.96),
///     Entity::new("dresden", 51.05, 13.74),
/// ];
/// let p = Partition::new(vec![0, 1, 2, 3], 4).unwrap();
/// assert_eq!(compass_names(&entities, &p), vec!["North", "South", "West", "East"]);
/// ```
pub fn compass_names(entities: &[Entity], partition: &Partition) -> Vec<String> {
    let k = partition.num_groups();
    let fallback =
        GeoPoint::mean(entities.iter().map(Entity::point)).unwrap_or(GeoPoint::new(0.0, 0.0));
    let centroids: Vec<GeoPoint> = partition
        .centroids(entities)
        .into_iter()
        .enumerate()
        .map(|(g, c)| {
            c.unwrap_or_else(|| {
                warn!("group {g} is empty; naming it from the overall centre");
                fallback
            })
        })
        .collect();

    let names: Vec<&str> = match k {
        1 => vec![CENTRAL],
        2 => two_way(&centroids),
        4 => four_way(&centroids),
        _ => eight_wind(&centroids),
    };
    disambiguate(&names)
}

fn two_way(c: &[GeoPoint]) -> Vec<&'static str> {
    let mid_lat = ((c[0].lat() + c[1].lat()) / 2.0).to_radians();
    let lat_spread = (c[0].lat() - c[1].lat()).abs();
    let lon_spread = (c[0].lon() - c[1].lon()).abs() * mid_lat.cos();
    if lat_spread >= lon_spread {
        if c[0].lat() >= c[1].lat() {
            vec![NORTH, SOUTH]
        } else {
            vec![SOUTH, NORTH]
        }
    } else if c[0].lon() <= c[1].lon() {
        vec![WEST, EAST]
    } else {
        vec![EAST, WEST]
    }
}

fn four_way(c: &[GeoPoint]) -> Vec<&'static str> {
    let north = argmax_by(c, |p| p.lat());
    let south = argmax_by(c, |p| -p.lat());
    let remaining: Vec<usize> = (0..c.len()).filter(|&g| g != north && g != south).collect();

    let mut names = vec![""; c.len()];
    if let &[x, y] = remaining.as_slice() {
        let (west, east) = if c[x].lon() < c[y].lon() { (x, y) } else { (y, x) };
        names[north] = NORTH;
        names[south] = SOUTH;
        names[west] = WEST;
        names[east] = EAST;
    } else {
        warn!("all group centroids share one latitude; naming by longitude");
        let mut order: Vec<usize> = (0..c.len()).collect();
        order.sort_by(|&a, &b| c[a].lon().total_cmp(&c[b].lon()));
        for (&g, name) in order.iter().zip([WEST, SOUTH, NORTH, EAST]) {
            names[g] = name;
        }
    }
    names
}

fn eight_wind(c: &[GeoPoint]) -> Vec<&'static str> {
    let Some(centre) = GeoPoint::mean(c.iter().copied()) else {
        return Vec::new();
    };
    let cos_lat = centre.lat().to_radians().cos();
    c.iter()
        .map(|p| {
            let north = p.lat() - centre.lat();
            let east = (p.lon() - centre.lon()) * cos_lat;
            if north.abs() < 1e-9 && east.abs() < 1e-9 {
                return CENTRAL;
            }
            let bearing = east.atan2(north).to_degrees().rem_euclid(360.0);
            let sector = ((bearing + 22.5) / 45.0).floor() as usize % WINDS.len();
            WINDS[sector]
        })
        .collect()
}

/// Index of the first maximum of `key`.
fn argmax_by(c: &[GeoPoint], key: impl Fn(&GeoPoint) -> f64) -> usize {
    let mut best = 0;
    for g in 1..c.len() {
        if key(&c[g]) > key(&c[best]) {
            best = g;
        }
    }
    best
}

/// Appends " 1", " 2", … to names that occur more than once, in group order.
fn disambiguate(names: &[&str]) -> Vec<String> {
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for &name in names {
        *totals.entry(name).or_default() += 1;
    }
    let mut seen: HashMap<&str, usize> = HashMap::new();
    names
        .iter()
        .map(|&name| {
            if totals[name] > 1 {
                let n = seen.entry(name).or_default();
                *n += 1;
                format!("{name} {n}")
            } else {
                name.to_string()
            }
        })
        .collect()
}
