#[spark_stub::interface]
struct Ledger;

fn main() {}
