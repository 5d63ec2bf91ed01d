/*!
 * Arena Demo - Main Entry Point
 *
 * Small driver that exercises the allocator and dumps its state:
 * - Initializes a 2MB arena
 * - Runs an allocate/deallocate churn through the trait surface
 * - Prints the decoded handle and JSON statistics
 */

use std::error::Error;

use arena_alloc::{Allocator, Arena, MemoryInfo};
use log::info;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    info!("initializing arena...");
    let mut arena = Arena::new();
    arena.init(2_000_000)?;

    let survivors = churn(&mut arena)?;
    info!("churn done, {} blocks still live", survivors.len());

    let handle = arena.handle();
    println!(
        "handle: mem_size={} mav_size={} free={} used={}",
        handle.mem_size(),
        handle.mav_size(),
        handle.num_free(),
        handle.num_used()
    );
    report(&arena)?;

    for address in survivors {
        arena.deallocate(address)?;
    }
    arena.deinit();
    Ok(())
}

/// Allocate a spread of block sizes, fill some, release every other one.
fn churn<A: Allocator>(arena: &mut A) -> Result<Vec<usize>, Box<dyn Error>> {
    let mut blocks = Vec::new();
    for (i, size) in [64usize, 512, 4096, 24, 1000, 8].into_iter().enumerate() {
        let address = if i % 2 == 0 {
            arena.allocate(size)?
        } else {
            arena.allocate_filled(size, b'+')?
        };
        info!("allocated {} bytes at offset 0x{:x}", size, address);
        blocks.push(address);
    }
    let mut survivors = Vec::new();
    for (i, address) in blocks.into_iter().enumerate() {
        if i % 2 == 1 {
            arena.deallocate(address)?;
            info!("released block at offset 0x{:x}", address);
        } else {
            survivors.push(address);
        }
    }
    Ok(survivors)
}

fn report<A: MemoryInfo>(arena: &A) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(&arena.stats())?);
    Ok(())
}
