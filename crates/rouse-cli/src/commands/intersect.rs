use crate::cli::IntersectArgs;
use crate::error::Result;
use rouse::core::io::columns::read_curve;
use rouse::core::math::intersection::{Intersection, find_intersection};
use tracing::info;

pub fn run(args: IntersectArgs) -> Result<()> {
    match locate(&args)? {
        Some(point) => println!("{}\t{}", point.x, point.y),
        None => println!("no intersection"),
    }
    Ok(())
}

fn locate(args: &IntersectArgs) -> Result<Option<Intersection>> {
    let first = read_curve(&args.first)?;
    let second = read_curve(&args.second)?;
    info!(
        first_points = first.len(),
        second_points = second.len(),
        "Searching for intersection."
    );
    Ok(find_intersection(&first, &second)?)
}
