//! Static shop data: the service menu, branches and gift-card amounts.
//!
//! The menu is what the services page advertises. Booking from it maps the
//! chosen entry onto a real backend service (see [`match_backend_service`]).

use delegends_core::Money;
use rust_decimal::Decimal;

use crate::api::{BranchRef, Service};

const PHOTO_GROOM: &str =
    "https://images.unsplash.com/photo-1621605815971-fbc98d665033?w=500&h=350&fit=crop";
const PHOTO_CHAIR: &str =
    "https://images.unsplash.com/photo-1503951914875-452162b0f3f1?w=500&h=350&fit=crop";
const PHOTO_SHOP: &str =
    "https://images.unsplash.com/photo-1585747860715-2ba37e788b70?w=500&h=350&fit=crop";
const PHOTO_TRIM: &str =
    "https://images.unsplash.com/photo-1621607512214-68297480165e?w=500&h=350&fit=crop";
const PHOTO_BEARD: &str =
    "https://images.unsplash.com/photo-1605497788044-5a32c7078486?w=500&h=350&fit=crop";
const PHOTO_SHAVE: &str =
    "https://images.unsplash.com/photo-1599351431202-1e0f0137899a?w=500&h=350&fit=crop";
const PHOTO_SPA: &str =
    "https://images.unsplash.com/photo-1544161515-4ab6ce6db874?w=500&h=350&fit=crop";

/// One advertised service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    /// Stable key; also the stem of its translation keys.
    pub key: &'static str,
    pub price_cents: i64,
    pub image: &'static str,
}

impl MenuItem {
    #[must_use]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Translation key of the display name.
    #[must_use]
    pub fn name_key(&self) -> String {
        format!("services.{}Name", self.key)
    }

    /// Translation key of the description.
    #[must_use]
    pub fn description_key(&self) -> String {
        format!("services.{}Desc", self.key)
    }
}

/// A group of advertised services.
#[derive(Debug, Clone, Copy)]
pub struct MenuCategory {
    /// Translation key stem under `servicesPage`.
    pub key: &'static str,
    pub emoji: &'static str,
    /// Category name the backend uses on its services.
    pub backend_category: &'static str,
    pub items: &'static [MenuItem],
}

const fn item(key: &'static str, price_cents: i64, image: &'static str) -> MenuItem {
    MenuItem {
        key,
        price_cents,
        image,
    }
}

/// The advertised service menu, in display order.
pub const SERVICE_MENU: &[MenuCategory] = &[
    MenuCategory {
        key: "special",
        emoji: "💈",
        backend_category: "Special Services",
        items: &[
            item("groomsmaid", 5999, PHOTO_GROOM),
            item("groomClassic", 7499, PHOTO_CHAIR),
            item("groomPlus", 13499, PHOTO_SHOP),
        ],
    },
    MenuCategory {
        key: "body",
        emoji: "💆",
        backend_category: "Body Massage",
        items: &[
            item("facial", 999, PHOTO_SPA),
            item("facialX", 1499, PHOTO_SPA),
            item("massage", 1499, PHOTO_SPA),
            item("miniBodyMassage", 1199, PHOTO_SPA),
        ],
    },
    MenuCategory {
        key: "beard",
        emoji: "🧔",
        backend_category: "Beard Services",
        items: &[
            item("beardDryShave", 3999, PHOTO_TRIM),
            item("earCandleWax", 1199, PHOTO_SPA),
            item("beardPro", 3499, PHOTO_BEARD),
            item("beard", 2499, PHOTO_BEARD),
        ],
    },
    MenuCategory {
        key: "hairdressing",
        emoji: "✂️",
        backend_category: "Hairdressing",
        items: &[
            item("kidsHaircut", 2499, PHOTO_CHAIR),
            item("legendsVIP", 19999, PHOTO_SHOP),
            item("headShaving", 2999, PHOTO_SHAVE),
            item("haircutProMaxx", 4999, PHOTO_TRIM),
            item("haircutPro", 3499, PHOTO_CHAIR),
            item("haircut", 2499, PHOTO_CHAIR),
        ],
    },
];

/// Find an advertised service by key.
#[must_use]
pub fn find_menu_item(key: &str) -> Option<&'static MenuItem> {
    SERVICE_MENU
        .iter()
        .flat_map(|category| category.items)
        .find(|item| item.key == key)
}

/// Largest price gap (EUR) at which a backend service still counts as the
/// same offering as a menu entry.
const PRICE_MATCH_TOLERANCE: i64 = 10;

/// Pick the backend service to book for a menu entry: the first one priced
/// within €10 of the advertised price, else the first service offered.
#[must_use]
pub fn match_backend_service<'a>(item: &MenuItem, services: &'a [Service]) -> Option<&'a Service> {
    let tolerance = Decimal::from(PRICE_MATCH_TOLERANCE);
    services
        .iter()
        .find(|service| service.price.abs_diff(item.price()) < tolerance)
        .or_else(|| services.first())
}

/// A physical shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub id: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub map_url: &'static str,
    pub image: &'static str,
}

impl Branch {
    /// The branch as embedded in booking requests.
    #[must_use]
    pub fn to_ref(&self) -> BranchRef {
        BranchRef {
            id: self.id.to_string(),
            name: self.name.to_string(),
            address: self.address.to_string(),
        }
    }
}

pub const BRANCHES: &[Branch] = &[
    Branch {
        id: "location-1",
        name: "De Legends Barbershop – OLDTOWN",
        address: "Pilies g. 38 Vilnius, LT-01123",
        map_url: "https://maps.app.goo.gl/8z77Btrk2Lv6977S7",
        image: "https://images.unsplash.com/photo-1585747860715-2ba37e788b70?w=500&h=300&fit=crop",
    },
    Branch {
        id: "location-2",
        name: "De Legends Barbershop – BIG VILNIUS",
        address: "Ukmergės g. 369 Vilnius, LT-06331",
        map_url: "https://maps.app.goo.gl/qHjJVtjcx5JP3LQa9",
        image: "https://images.unsplash.com/photo-1503951914875-452162b0f3f1?w=500&h=300&fit=crop",
    },
];

#[must_use]
pub fn find_branch(id: &str) -> Option<&'static Branch> {
    BRANCHES.iter().find(|branch| branch.id == id)
}

/// Gift-card amount offered on the gift cards page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GiftCardDenomination {
    pub euros: i64,
    pub popular: bool,
}

impl GiftCardDenomination {
    #[must_use]
    pub fn amount(&self) -> Money {
        Money::from_major(self.euros)
    }

    /// Cards of €100 or more cover several services.
    #[must_use]
    pub const fn covers_multiple_services(&self) -> bool {
        self.euros >= 100
    }
}

pub const GIFT_CARD_DENOMINATIONS: &[GiftCardDenomination] = &[
    GiftCardDenomination { euros: 25, popular: false },
    GiftCardDenomination { euros: 50, popular: true },
    GiftCardDenomination { euros: 75, popular: false },
    GiftCardDenomination { euros: 100, popular: true },
    GiftCardDenomination { euros: 150, popular: false },
    GiftCardDenomination { euros: 200, popular: false },
];

/// Postage added to physical gift cards (EUR).
pub const PHYSICAL_CARD_SHIPPING_EUROS: i64 = 5;

#[must_use]
pub fn find_denomination(euros: i64) -> Option<&'static GiftCardDenomination> {
    GIFT_CARD_DENOMINATIONS.iter().find(|d| d.euros == euros)
}

/// Product categories on the shop page: (filter value, translation key).
pub const PRODUCT_CATEGORIES: &[(&str, &str)] = &[
    ("Hair care", "productsPage.hairCare"),
    ("Face and body", "productsPage.faceAndBody"),
    ("Beards", "productsPage.beards"),
    ("Hairdressing supplies", "productsPage.hairdressingSupplies"),
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use delegends_core::ServiceId;

    use super::*;

    fn service(id: &str, cents: i64) -> Service {
        Service {
            id: ServiceId::new(id),
            name: id.to_string(),
            description: String::new(),
            price: Money::from_cents(cents),
            duration: 30,
            category: None,
        }
    }

    #[test]
    fn test_menu_keys_are_unique() {
        let mut keys: Vec<_> = SERVICE_MENU
            .iter()
            .flat_map(|c| c.items)
            .map(|i| i.key)
            .collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(total, 17);
    }

    #[test]
    fn test_find_menu_item() {
        let item = find_menu_item("haircutPro").unwrap();
        assert_eq!(item.price(), Money::from_cents(3499));
        assert_eq!(item.name_key(), "services.haircutProName");
        assert!(find_menu_item("nope").is_none());
    }

    #[test]
    fn test_match_backend_service_within_tolerance() {
        let services = vec![service("cheap", 1000), service("mid", 3000), service("vip", 20000)];
        let item = find_menu_item("haircutPro").unwrap();
        assert_eq!(match_backend_service(item, &services).unwrap().id.as_str(), "mid");
    }

    #[test]
    fn test_match_backend_service_falls_back_to_first() {
        let services = vec![service("cheap", 1000), service("mid", 3000)];
        let item = find_menu_item("legendsVIP").unwrap();
        assert_eq!(match_backend_service(item, &services).unwrap().id.as_str(), "cheap");
        assert!(match_backend_service(item, &[]).is_none());
    }

    #[test]
    fn test_branches_and_denominations() {
        assert_eq!(find_branch("location-2").unwrap().to_ref().id, "location-2");
        assert!(find_branch("location-9").is_none());

        let popular: Vec<_> = GIFT_CARD_DENOMINATIONS
            .iter()
            .filter(|d| d.popular)
            .map(|d| d.euros)
            .collect();
        assert_eq!(popular, vec![50, 100]);
        assert!(find_denomination(100).unwrap().covers_multiple_services());
        assert!(!find_denomination(75).unwrap().covers_multiple_services());
    }
}
