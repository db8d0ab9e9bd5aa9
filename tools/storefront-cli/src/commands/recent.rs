//! Recently viewed commands.

use anyhow::Result;
use dialoguer::Confirm;
use storefront_commerce::catalog::{format_price, Product};
use storefront_commerce::ProductId;

use super::{RecentArgs, RecentCommand};
use crate::context::Context;

pub async fn run(args: RecentArgs, ctx: &Context) -> Result<()> {
    let (shop, mut events) = ctx.storefront()?;

    match args.command {
        RecentCommand::List { limit } => {
            let entries = match limit {
                Some(limit) => shop.recently_viewed().get(limit),
                None => shop.recent_products(),
            };

            if ctx.output.is_json() {
                ctx.output.json(&entries);
                return Ok(());
            }
            if entries.is_empty() {
                ctx.output.info("No recently viewed products");
                return Ok(());
            }

            ctx.output.header("Recently viewed");
            let widths = [12, 32, 10, 10];
            ctx.output
                .table_row(&["ID", "NAME", "PRICE", "CATEGORY"], &widths);
            for entry in &entries {
                let price = format_price(entry.new_price);
                ctx.output.table_row(
                    &[entry.id.as_str(), &entry.name, &price, &entry.category],
                    &widths,
                );
            }
        }

        RecentCommand::View {
            product,
            name,
            price,
            old_price,
            category,
            image,
        } => {
            let product = Product {
                id: ProductId::new(product),
                name,
                image,
                old_price,
                new_price: price,
                category,
                tags: Vec::new(),
                rating: None,
                stock: None,
            };
            shop.view_product(&product).await;
            ctx.output.success(&format!("Viewed {}", product.name));
        }

        RecentCommand::Remove { product } => {
            if shop.recently_viewed().remove(&ProductId::new(product.as_str())) {
                ctx.output.success(&format!("Removed {}", product));
            } else {
                ctx.output
                    .warn(&format!("{} is not in the recently viewed list", product));
            }
        }

        RecentCommand::Clear { yes } => {
            if !yes
                && !Confirm::new()
                    .with_prompt("Clear recently viewed products?")
                    .default(false)
                    .interact()?
            {
                ctx.output.info("Cancelled");
                return Ok(());
            }
            shop.recently_viewed().clear();
            ctx.output.success("Recently viewed products cleared");
        }
    }

    ctx.flush_toasts(&mut events);
    Ok(())
}
