//! Cart commands.

use anyhow::Result;
use serde_json::json;
use storefront_commerce::catalog::Product;
use storefront_commerce::{CommerceError, ProductId};

use super::{CartArgs, CartCommand};
use crate::context::Context;

pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CartCommand::Add {
            product,
            size,
            quantity,
            stock,
            after_login,
        } => add(ctx, &product, size.as_deref(), quantity, stock, after_login).await,
    }
}

async fn add(
    ctx: &Context,
    product_id: &str,
    size: Option<&str>,
    quantity: i64,
    stock: Option<u32>,
    after_login: bool,
) -> Result<()> {
    let (shop, mut events) = ctx.storefront()?;

    // Only the id and stock matter for adding; the server knows the rest.
    let product = Product {
        id: ProductId::new(product_id),
        name: product_id.to_string(),
        image: String::new(),
        old_price: None,
        new_price: 0.0,
        category: String::new(),
        tags: Vec::new(),
        rating: None,
        stock,
    };

    if after_login {
        let units = shop.cart().validate(&product, size, quantity)?;
        shop.remember_for_login(product.id.clone(), units, size);
        ctx.output
            .success("Saved. The item will be added after you log in (shop login)");
        return Ok(());
    }

    let spinner = ctx.output.spinner("Adding to cart...");
    let result = shop.add_to_cart(&product, size, quantity).await;
    spinner.finish_and_clear();
    ctx.flush_toasts(&mut events);

    match result {
        Ok(report) => {
            if ctx.output.is_json() {
                ctx.output.json(&json!({
                    "requested": report.requested,
                    "added": report.added,
                    "guest": report.guest,
                }));
            } else if report.guest {
                ctx.output
                    .info("Added to a guest cart. Log in to keep it with your account");
            }
            Ok(())
        }
        Err(CommerceError::PartialAdd {
            added,
            requested,
            message,
        }) => {
            if ctx.output.is_json() {
                ctx.output.json(&json!({
                    "requested": requested,
                    "added": added,
                    "error": message,
                }));
            }
            anyhow::bail!("{} of {} units added", added, requested)
        }
        Err(e) => {
            tracing::debug!(error = %e, "add to cart failed");
            anyhow::bail!("Item not added")
        }
    }
}
