/// The shop catalog. Prices live here, not in the cart: checkout always
/// charges the current price, falling back to the stored one only for
/// delisted products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub price_minor: i32,
    pub image: &'static str,
}

pub const PRODUCTS: [Product; 4] = [
    Product {
        id: "saints-bw-oversized",
        name: "Saints B&W Tee (oversized)",
        price_minor: 6800,
        image: "/public/img/shop/saints-bw-oversized.png",
    },
    Product {
        id: "saints-bw-regular",
        name: "Saints B&W Tee (regular)",
        price_minor: 5800,
        image: "/public/img/shop/saints-bw-regular.png",
    },
    Product {
        id: "saints-color-oversized",
        name: "Saints Color Tee (oversized)",
        price_minor: 6800,
        image: "/public/img/shop/saints-color-oversized.png",
    },
    Product {
        id: "saints-color-regular",
        name: "Saints Color Tee (regular)",
        price_minor: 5800,
        image: "/public/img/shop/saints-color-regular.png",
    },
];

pub fn find_product(product_id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|product| product.id == product_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_listed_products() {
        let product = find_product("saints-bw-regular").unwrap();
        assert_eq!(product.price_minor, 5800);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        assert!(find_product("saints-bw").is_none());
        assert!(find_product("").is_none());
    }
}
