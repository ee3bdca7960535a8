#[spark_stub::interface]
trait Ledger<T> {
    fn get(&self) -> Result<T, spark_stub::StubError>;
}

fn main() {}
