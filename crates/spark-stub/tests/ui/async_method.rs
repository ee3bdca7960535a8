#[spark_stub::interface]
trait Ledger {
    async fn refresh(&self) -> Result<(), spark_stub::StubError>;
}

fn main() {}
