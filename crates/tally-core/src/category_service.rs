use tally_domain::{names_match, Category};

use crate::{repository::Repository, CoreError};

pub struct CategoryService;

impl CategoryService {
    pub fn list(repo: &Repository<'_>) -> Result<Vec<Category>, CoreError> {
        repo.categories()
    }

    /// Inserts or replaces a category. Names are unique ignoring case.
    pub fn save(repo: &Repository<'_>, category: Category) -> Result<(), CoreError> {
        let mut categories = repo.categories()?;
        Self::validate_name(&categories, &category)?;
        match categories.iter_mut().find(|existing| existing.id == category.id) {
            Some(existing) => *existing = category,
            None => categories.push(category),
        }
        repo.save_categories(&categories)
    }

    /// Returns `false` without touching anything when the category is unknown
    /// or still used by a transaction.
    pub fn delete(repo: &Repository<'_>, id: &str) -> Result<bool, CoreError> {
        if repo
            .transactions()?
            .iter()
            .any(|txn| txn.category_id == id)
        {
            tracing::warn!(category = id, "refusing to delete category with transactions");
            return Ok(false);
        }
        let mut categories = repo.categories()?;
        let before = categories.len();
        categories.retain(|category| category.id != id);
        if categories.len() == before {
            return Ok(false);
        }
        repo.save_categories(&categories)?;
        Ok(true)
    }

    fn validate_name(categories: &[Category], candidate: &Category) -> Result<(), CoreError> {
        if candidate.name.trim().is_empty() {
            return Err(CoreError::Validation("category name must not be empty".into()));
        }
        let duplicate = categories.iter().any(|category| {
            category.id != candidate.id && names_match(&category.name, &candidate.name)
        });
        if duplicate {
            Err(CoreError::Validation(format!(
                "Category `{}` already exists",
                candidate.name
            )))
        } else {
            Ok(())
        }
    }
}
