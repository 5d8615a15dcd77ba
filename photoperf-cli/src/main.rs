fn main() -> anyhow::Result<()> {
    photoperf_cli::run()
}
