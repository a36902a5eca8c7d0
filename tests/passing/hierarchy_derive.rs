use strata::*;

#[derive(HierarchyType)]
pub struct Animal;

#[derive(HierarchyType)]
#[hierarchy(parent = Animal)]
pub struct Dog;

#[derive(HierarchyType)]
#[hierarchy(parent = Dog, name = "Kennel::Puppy", writable_table = "puppy_rows")]
pub struct Puppy;

#[derive(HierarchyType)]
#[hierarchy(table_name = "people", type_column = "kind")]
pub struct Person {
    pub name: String,
}

fn main() {
    let mut hierarchy = Hierarchy::new();
    hierarchy.register_type::<Animal>().unwrap();
    hierarchy.register_type::<Dog>().unwrap();
    hierarchy.register_type::<Puppy>().unwrap();
    hierarchy.register_type::<Person>().unwrap();

    assert_eq!(Puppy::declaration(), TypeDecl::child("Kennel::Puppy", "Dog"));
    assert_eq!(hierarchy.descriptor("Kennel::Puppy").unwrap().writable_table(), "puppy_rows");
    assert_eq!(hierarchy.descriptor("Person").unwrap().identity_column_name, "kind");
    assert_eq!(hierarchy.behavior_profile("Animal").unwrap(), Behavior::Root);
    assert_eq!(hierarchy.behavior_profile("Dog").unwrap(), Behavior::Child);
    let _ = Person { name: "Ada".to_string() };
}
