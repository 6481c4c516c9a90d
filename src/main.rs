fn main() -> anyhow::Result<()> {
    crm_search::run()
}
