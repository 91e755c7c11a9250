//! This example walks through the addition cache and prints each hit and
//! miss. Run with `RUST_LOG=trace cargo run --example basic`.

use pairmemo::{MemoizedSum, Slot, memoize};
use tracing_subscriber::EnvFilter;

fn main() -> pairmemo::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .init();

    let mut sum = MemoizedSum::new();
    println!("{}", sum.call(3.0, 4.0)?); // [Miss] The cache is empty.
    println!("{}", sum.call(3.0, 4.0)?); // [Hit]  Same pair.
    println!("{}", sum.call(4.0, 3.0)?); // [Miss] The key is ordered.
    println!("computations: {}", sum.computations());

    if let Err(err) = sum.call(f64::NAN, 1.0) {
        println!("rejected: {err}");
    }

    // A value derived from props is only recomputed when they change.
    let mut percentage = Slot::new();
    for marks in [90, 90, 75] {
        println!("{}", percentage.get_or_compute(marks, |&m| m * 100 / 100));
    }

    double(2); // [Miss] The cache is empty.
    double(2); // [Hit]  Same number.

    Ok(())
}

/// Double a number.
#[memoize]
fn double(x: u32) -> u32 {
    2 * x
}
