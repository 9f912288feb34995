//! Walks through the basic table operations and prints each result.

use probemap::{LinearHashMap, TableError};

fn main() {
    let mut table = LinearHashMap::new();

    table.insert("key1".to_string(), 1);
    table.insert("key2".to_string(), 2);
    table.insert("key3".to_string(), 3);

    print_lookup(&table, "key2");

    match table.remove("key2") {
        Ok(value) => println!("Removed key2 (value {value})"),
        Err(err) => println!("Could not remove key2: {err}"),
    }

    print_lookup(&table, "key2");

    println!(
        "Table holds {} entries in {} slots (load factor {:.2})",
        table.len(),
        table.capacity(),
        table.load_factor()
    );
}

/// Prints the value stored for `key`, or the lookup error
fn print_lookup(table: &LinearHashMap<String, i32>, key: &str) {
    match table.search(key) {
        Ok(value) => println!("Value for {key}: {value}"),
        Err(TableError::NotFound) => println!("Value for {key}: {}", TableError::NotFound),
    }
}
