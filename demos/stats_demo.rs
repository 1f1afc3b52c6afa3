use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use strided::HashTable;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: u32,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.75)]
    load_factor: f32,

    /// Remove this percentage of the keys again after filling.
    #[arg(short = 'r', long = "remove_percent", default_value_t = 0)]
    remove_percent: u8,

    /// Use random keys instead of `0..n`.
    #[arg(long)]
    random: bool,
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashTable with target capacity {} at load factor {}",
        args.target_capacity, args.load_factor
    );

    let mut table: HashTable<u64> = HashTable::with_capacity(args.target_capacity, args.load_factor);

    println!("Actual capacity: {}", table.capacity());
    println!("Filling table with u64 values...");

    let mut rng = SmallRng::seed_from_u64(0x5EED);
    let keys = (0..args.target_capacity)
        .map(|i| {
            if args.random {
                rng.random_range(0..u32::MAX)
            } else {
                i
            }
        })
        .collect::<Vec<u32>>();

    for &key in &keys {
        table.insert(key, u64::from(key));
    }

    let capacity = table.capacity();
    println!("Inserted {} values into table", table.len());

    if args.remove_percent > 0 {
        let removed = keys
            .iter()
            .filter(|_| rng.random_range(0..100) < args.remove_percent)
            .filter(|&&key| table.remove(key).is_some())
            .count();
        println!("Removed {removed} values, {} remain", table.len());
    }

    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );
    assert_eq!(table.capacity(), capacity, "removal never shrinks the table");

    table.probe_histogram().print();
    table.debug_stats().print();
}
