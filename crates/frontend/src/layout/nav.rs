//! Навигация: страницы приложения и роли, которым они доступны

use contracts::system::auth::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub key: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    roles: &'static [UserRole],
}

impl NavItem {
    pub fn roles(&self) -> Vec<UserRole> {
        self.roles.to_vec()
    }

    pub fn visible_for(&self, role: UserRole) -> bool {
        role == UserRole::Admin || self.roles.contains(&role)
    }
}

pub const D400_ECONOMICS: &str = "d400_economics";
pub const D401_BILLING: &str = "d401_billing";
pub const D402_CONTRACT_PIPELINE: &str = "d402_contract_pipeline";
pub const D403_TECHNICIAN_RANKING: &str = "d403_technician_ranking";
pub const D404_TECHNICIAN_PORTAL: &str = "d404_technician_portal";
pub const A001_CONTRACT: &str = "a001_contract";

pub const NAV_ITEMS: &[NavItem] = &[
    NavItem {
        key: D400_ECONOMICS,
        title: "Экономика",
        icon: "economics",
        roles: &[],
    },
    NavItem {
        key: D401_BILLING,
        title: "Счета и оплаты",
        icon: "billing",
        roles: &[],
    },
    NavItem {
        key: D402_CONTRACT_PIPELINE,
        title: "Воронка договоров",
        icon: "pipeline",
        roles: &[],
    },
    NavItem {
        key: D403_TECHNICIAN_RANKING,
        title: "Рейтинг техников",
        icon: "ranking",
        roles: &[],
    },
    NavItem {
        key: A001_CONTRACT,
        title: "Договоры",
        icon: "contracts",
        roles: &[UserRole::Customer],
    },
    NavItem {
        key: D404_TECHNICIAN_PORTAL,
        title: "Мои комиссии",
        icon: "portal",
        roles: &[UserRole::Technician],
    },
];

pub fn items_for(role: UserRole) -> Vec<NavItem> {
    NAV_ITEMS
        .iter()
        .copied()
        .filter(|item| item.visible_for(role))
        .collect()
}

/// Страница для ключа из адресной строки; недоступный ключ заменяется первой доступной страницей
pub fn resolve_page(role: UserRole, requested: Option<&str>) -> Option<NavItem> {
    let items = items_for(role);
    requested
        .and_then(|key| items.iter().copied().find(|i| i.key == key))
        .or_else(|| items.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_filtered_by_role() {
        assert_eq!(items_for(UserRole::Admin).len(), NAV_ITEMS.len());
        let tech: Vec<&str> = items_for(UserRole::Technician).iter().map(|i| i.key).collect();
        assert_eq!(tech, vec![D404_TECHNICIAN_PORTAL]);
        let customer: Vec<&str> = items_for(UserRole::Customer).iter().map(|i| i.key).collect();
        assert_eq!(customer, vec![A001_CONTRACT]);
    }

    #[test]
    fn test_resolve_page_falls_back() {
        assert_eq!(
            resolve_page(UserRole::Customer, Some(D400_ECONOMICS)).map(|i| i.key),
            Some(A001_CONTRACT)
        );
        assert_eq!(
            resolve_page(UserRole::Admin, Some(D403_TECHNICIAN_RANKING)).map(|i| i.key),
            Some(D403_TECHNICIAN_RANKING)
        );
        assert_eq!(
            resolve_page(UserRole::Admin, None).map(|i| i.key),
            Some(D400_ECONOMICS)
        );
    }
}
