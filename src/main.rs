fn main() -> anyhow::Result<()> {
    aki::run()?;
    Ok(())
}
