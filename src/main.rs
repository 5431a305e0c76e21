fn main() -> anyhow::Result<()> {
    sectorscan_lib::run()
}
