//! Renders storefront state into an element tree.

use super::dom::{Action, Control, FakeNode};
use super::{FakeOptions, Route, State};
use crate::catalog::{format_price, sales_tax, SortOrder, ORDER_CONFIRMATION};
use crate::pages::{cart, checkout, inventory, login, product_detail};
use crate::users::UserClass;

/// One product as the storefront stores it
#[derive(Debug, Clone, Copy)]
pub(crate) struct FakeProduct {
    pub name: &'static str,
    pub price_cents: u64,
    pub description: &'static str,
    pub slug: &'static str,
    pub image: &'static str,
}

/// Inventory, indexed by item id
pub(crate) const PRODUCTS: [FakeProduct; 6] = [
    FakeProduct {
        name: "Sauce Labs Bike Light",
        price_cents: 999,
        description: "A red light isn't the desired state in testing but it sure helps when riding your bike at night. Water-resistant with 3 lighting modes, 1 AAA battery included.",
        slug: "sauce-labs-bike-light",
        image: "/static/media/bike-light-1200x1500.jpg",
    },
    FakeProduct {
        name: "Sauce Labs Bolt T-Shirt",
        price_cents: 1599,
        description: "Get your testing superhero on with the Sauce Labs bolt T-shirt. From American Apparel, 100% ringspun combed cotton, heather gray with red bolt.",
        slug: "sauce-labs-bolt-t-shirt",
        image: "/static/media/bolt-shirt-1200x1500.jpg",
    },
    FakeProduct {
        name: "Sauce Labs Onesie",
        price_cents: 799,
        description: "Rib snap infant onesie for the junior automation engineer in development. Reinforced 3-snap bottom closure, two-needle hemmed sleeved and bottom won't unravel.",
        slug: "sauce-labs-onesie",
        image: "/static/media/red-onesie-1200x1500.jpg",
    },
    FakeProduct {
        name: "Test.allTheThings() T-Shirt (Red)",
        price_cents: 1599,
        description: "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard to automate a few tests. Super-soft and comfy ringspun combed cotton.",
        slug: "test.allthethings()-t-shirt-(red)",
        image: "/static/media/red-tatt-1200x1500.jpg",
    },
    FakeProduct {
        name: "Sauce Labs Backpack",
        price_cents: 2999,
        description: "carry.allTheThings() with the sleek, streamlined Sly Pack that melds uncompromising style with unequaled laptop and tablet protection.",
        slug: "sauce-labs-backpack",
        image: "/static/media/sauce-backpack-1200x1500.jpg",
    },
    FakeProduct {
        name: "Sauce Labs Fleece Jacket",
        price_cents: 4999,
        description: "It's not every day that you come across a midweight quarter-zip fleece jacket capable of handling everything from a relaxing day outdoors to a busy day at the office.",
        slug: "sauce-labs-fleece-jacket",
        image: "/static/media/sauce-pullover-1200x1500.jpg",
    },
];

/// Item id of a product name
pub(crate) fn product_id(name: &str) -> Option<usize> {
    PRODUCTS.iter().position(|product| product.name == name)
}

/// Item ids in display order
pub(crate) fn sorted_ids(order: SortOrder) -> Vec<usize> {
    let mut ids: Vec<usize> = (0..PRODUCTS.len()).collect();
    ids.sort_by(|&a, &b| {
        let (pa, pb) = (&PRODUCTS[a], &PRODUCTS[b]);
        match order {
            SortOrder::NameAscending => pa.name.cmp(pb.name),
            SortOrder::NameDescending => pb.name.cmp(pa.name),
            SortOrder::PriceAscending => pa.price_cents.cmp(&pb.price_cents).then(pa.name.cmp(pb.name)),
            SortOrder::PriceDescending => pb.price_cents.cmp(&pa.price_cents).then(pa.name.cmp(pb.name)),
        }
    });
    ids
}

pub(crate) fn render(state: &State, options: &FakeOptions) -> Vec<FakeNode> {
    match &state.route {
        Route::Blank | Route::Other(_) => Vec::new(),
        Route::Login => render_login(state),
        Route::Inventory => {
            let mut nodes = header(state);
            nodes.push(sort_select(state.sort));
            nodes.extend(
                state
                    .display_order()
                    .into_iter()
                    .enumerate()
                    .map(|(position, id)| inventory_row(state, options, position, id)),
            );
            nodes
        }
        Route::Detail(id) => {
            let mut nodes = header(state);
            nodes.push(
                FakeNode::new(&[product_detail::BACK_TO_PRODUCTS])
                    .text("Back to products")
                    .action(Some(Action::BackToProducts)),
            );
            nodes.push(detail_body(state, *id));
            nodes
        }
        Route::Cart => {
            let mut nodes = header(state);
            nodes.extend(state.cart.iter().map(|&id| cart_row(state, id, true)));
            nodes.push(
                FakeNode::new(&[cart::CONTINUE_SHOPPING])
                    .text("Continue Shopping")
                    .action(Some(Action::ContinueShopping)),
            );
            nodes.push(
                FakeNode::new(&[cart::CHECKOUT])
                    .text("Checkout")
                    .action(Some(Action::Checkout)),
            );
            nodes
        }
        Route::CheckoutInformation => {
            let mut nodes = header(state);
            nodes.extend([
                FakeNode::new(&[checkout::FIRST_NAME_INPUT]).control(Control::FirstName),
                FakeNode::new(&[checkout::LAST_NAME_INPUT]).control(Control::LastName),
                FakeNode::new(&[checkout::POSTAL_CODE_INPUT]).control(Control::PostalCode),
            ]);
            if let Some(message) = &state.checkout_error {
                nodes.push(error_banner(message));
            }
            nodes.push(
                FakeNode::new(&[checkout::CANCEL_BUTTON])
                    .text("Cancel")
                    .action(Some(Action::CancelInformation)),
            );
            nodes.push(
                FakeNode::new(&[checkout::CONTINUE_BUTTON])
                    .attr("value", "Continue")
                    .action(Some(Action::ContinueCheckout)),
            );
            nodes
        }
        Route::CheckoutOverview => {
            let mut nodes = header(state);
            nodes.extend(state.cart.iter().map(|&id| cart_row(state, id, false)));
            nodes.push(order_summary(&state.cart));
            nodes.push(
                FakeNode::new(&[checkout::CANCEL_BUTTON])
                    .text("Cancel")
                    .action(Some(Action::CancelOverview)),
            );
            nodes.push(
                FakeNode::new(&[checkout::FINISH_BUTTON])
                    .text("Finish")
                    .action(Some(Action::FinishCheckout)),
            );
            nodes
        }
        Route::CheckoutComplete => {
            let mut nodes = header(state);
            nodes.extend([
                FakeNode::new(&[checkout::PONY_EXPRESS]).attr("src", "/static/media/pony-express.png"),
                FakeNode::new(&[checkout::COMPLETE_HEADER]).text(ORDER_CONFIRMATION),
                FakeNode::new(&[checkout::COMPLETE_TEXT]).text(
                    "Your order has been dispatched, and will arrive just as fast as the pony can get there!",
                ),
                FakeNode::new(&[checkout::BACK_HOME])
                    .text("Back Home")
                    .action(Some(Action::BackHome)),
            ]);
            nodes
        }
    }
}

fn error_banner(message: &str) -> FakeNode {
    FakeNode::new(&[login::ERROR_BANNER])
        .child(FakeNode::container().text(message))
        .child(FakeNode::new(&[login::ERROR_CLOSE_BUTTON]).action(Some(Action::DismissError)))
}

fn order_summary(cart: &[usize]) -> FakeNode {
    let item_total: u64 = cart.iter().map(|&id| PRODUCTS[id].price_cents).sum();
    let tax = sales_tax(item_total);
    FakeNode::new(&[checkout::SUMMARY_INFO]).children([
        FakeNode::new(&[checkout::ITEM_TOTAL_LABEL])
            .text(format!("Item total: {}", format_price(item_total))),
        FakeNode::new(&[checkout::TAX_LABEL]).text(format!("Tax: {}", format_price(tax))),
        FakeNode::new(&[checkout::TOTAL_LABEL])
            .text(format!("Total: {}", format_price(item_total + tax))),
    ])
}

fn render_login(state: &State) -> Vec<FakeNode> {
    let mut nodes = vec![
        FakeNode::new(&[login::USERNAME_INPUT]).control(Control::Username),
        FakeNode::new(&[login::PASSWORD_INPUT]).control(Control::Password),
    ];
    if let Some(message) = &state.login_error {
        nodes.push(error_banner(message));
    }
    nodes.push(
        FakeNode::new(&[login::LOGIN_BUTTON])
            .attr("value", "Login")
            .action(Some(Action::SubmitLogin)),
    );
    nodes
}

fn header(state: &State) -> Vec<FakeNode> {
    let mut cart_link = FakeNode::new(&[inventory::CART_LINK]).action(Some(Action::OpenCart));
    if !state.cart.is_empty() {
        cart_link = cart_link.child(
            FakeNode::new(&[inventory::CART_BADGE]).text(state.cart.len().to_string()),
        );
    }
    vec![
        FakeNode::new(&[inventory::MENU_BUTTON]).action(Some(Action::OpenMenu)),
        FakeNode::container().hidden(!state.menu_open).child(
            FakeNode::new(&[inventory::LOGOUT_LINK])
                .text("Logout")
                .action(Some(Action::Logout)),
        ),
        cart_link,
    ]
}

fn sort_select(order: SortOrder) -> FakeNode {
    FakeNode::new(&[inventory::SORT_SELECT])
        .attr("value", order.value())
        .control(Control::SortSelect)
}

fn image_src(user: Option<UserClass>, product: &FakeProduct) -> &'static str {
    match user {
        Some(UserClass::Problem) => "",
        _ => product.image,
    }
}

fn cart_button(state: &State, id: usize, slug_suffix: bool) -> FakeNode {
    let slug = PRODUCTS[id].slug;
    if state.cart.contains(&id) {
        let remove = (state.user != Some(UserClass::Error)).then_some(Action::RemoveFromCart(id));
        let dom_id = if slug_suffix { format!("remove-{slug}") } else { "remove".to_string() };
        FakeNode::new(&[inventory::REMOVE_BUTTON])
            .attr("id", dom_id)
            .text("Remove")
            .action(remove)
    } else {
        let dom_id = if slug_suffix {
            format!("add-to-cart-{slug}")
        } else {
            "add-to-cart".to_string()
        };
        FakeNode::new(&[inventory::ADD_TO_CART_BUTTON])
            .attr("id", dom_id)
            .text("Add to cart")
            .action(Some(Action::AddToCart(id)))
    }
}

fn inventory_row(state: &State, options: &FakeOptions, position: usize, id: usize) -> FakeNode {
    let product = &PRODUCTS[id];
    let open = Some(Action::OpenProduct(id));
    let image_hidden = state.user == Some(UserClass::Visual) && position == 0;

    let image_link = FakeNode::new(&[inventory::IMAGE_LINK])
        .attr("id", format!("item_{id}_img_link"))
        .action(if options.dead_image_links { None } else { open })
        .child(
            FakeNode::new(&[inventory::ITEM_IMAGE])
                .attr("src", image_src(state.user, product))
                .attr("alt", product.name)
                .hidden(image_hidden),
        );
    let title_link = FakeNode::new(&[inventory::TITLE_LINK])
        .attr("id", format!("item_{id}_title_link"))
        .action(if options.dead_title_links { None } else { open })
        .child(FakeNode::new(&[inventory::ITEM_NAME]).text(product.name));

    let mut pricebar = FakeNode::container();
    if !options.unreadable_rows.contains(&id) {
        pricebar = pricebar.child(
            FakeNode::new(&[inventory::ITEM_PRICE]).text(format_price(product.price_cents)),
        );
    }
    pricebar = pricebar.child(cart_button(state, id, true));

    FakeNode::new(&[inventory::INVENTORY_ITEM]).children([
        FakeNode::container().child(image_link),
        FakeNode::container()
            .child(title_link)
            .child(FakeNode::new(&[inventory::ITEM_DESC]).text(product.description)),
        pricebar,
    ])
}

fn detail_body(state: &State, id: usize) -> FakeNode {
    let Some(product) = PRODUCTS.get(id) else {
        return FakeNode::container()
            .child(FakeNode::new(&[product_detail::PRODUCT_NAME]).text("ITEM NOT FOUND"));
    };
    FakeNode::container().children([
        FakeNode::new(&[product_detail::PRODUCT_IMAGE])
            .attr("src", image_src(state.user, product))
            .attr("alt", product.name),
        FakeNode::new(&[product_detail::PRODUCT_NAME]).text(product.name),
        FakeNode::new(&[product_detail::PRODUCT_DESCRIPTION]).text(product.description),
        FakeNode::new(&[product_detail::PRODUCT_PRICE]).text(format_price(product.price_cents)),
        cart_button(state, id, false),
    ])
}

fn cart_row(state: &State, id: usize, removable: bool) -> FakeNode {
    let product = &PRODUCTS[id];
    let row = FakeNode::new(&[cart::CART_ITEM]).children([
        FakeNode::container().text("1"),
        FakeNode::new(&[inventory::ITEM_NAME]).text(product.name),
        FakeNode::new(&[inventory::ITEM_DESC]).text(product.description),
        FakeNode::new(&[inventory::ITEM_PRICE]).text(format_price(product.price_cents)),
    ]);
    if removable {
        row.child(cart_button(state, id, true))
    } else {
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{expected_price, EXPECTED_CATALOG};

    #[test]
    fn test_products_match_expected_catalog() {
        assert_eq!(PRODUCTS.len(), EXPECTED_CATALOG.len());
        for product in &PRODUCTS {
            assert_eq!(
                expected_price(product.name),
                Some(format_price(product.price_cents).as_str())
            );
        }
    }

    #[test]
    fn test_sorted_ids() {
        let names: Vec<_> = sorted_ids(SortOrder::NameAscending)
            .into_iter()
            .map(|id| PRODUCTS[id].name)
            .collect();
        assert_eq!(names[0], "Sauce Labs Backpack");
        assert_eq!(names[5], "Test.allTheThings() T-Shirt (Red)");

        let cheapest = sorted_ids(SortOrder::PriceAscending)[0];
        assert_eq!(PRODUCTS[cheapest].name, "Sauce Labs Onesie");
        let priciest = sorted_ids(SortOrder::PriceDescending)[0];
        assert_eq!(PRODUCTS[priciest].name, "Sauce Labs Fleece Jacket");
    }

    #[test]
    fn test_product_id_lookup() {
        assert_eq!(product_id("Sauce Labs Backpack"), Some(4));
        assert_eq!(product_id("Sauce Labs Bike Light"), Some(0));
        assert_eq!(product_id("Unknown"), None);
    }
}
