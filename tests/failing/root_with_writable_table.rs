use strata::HierarchyType;

#[derive(HierarchyType)]
#[hierarchy(writable_table = "animal_rows")]
pub struct Animal;

fn main() {
    let _ = Animal;
}
