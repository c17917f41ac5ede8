use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Recompute denormalized fields for every row (use `app.Model.field` notation)
    UpdateFields {
        /// Fields to refresh, e.g. `shop.Customer.order_count`
        #[arg(required = true, num_args = 1.., value_name = "FIELD")]
        fields: Vec<String>,
    },
}
