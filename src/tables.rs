//! Static tables required to generate PDF417 and MicroPDF417 barcodes.

/// Bar-space patterns for the 929 codewords in each of the three clusters
/// (cluster 0, 3 and 6). Each entry stores the low 16 bits of the 17-module
/// pattern, the leading module is always a bar.
pub const HL_TO_LL: [u16; 3 * 929] = [
    0xD5C0, 0xEAF0, 0xF57C, 0xD4E0, 0xEA78, 0xF53E, 0xA8C0, 0xD470,
    0xA860, 0x5040, 0xA830, 0x5020, 0xADC0, 0xD6F0, 0xEB7C, 0xACE0,
    0xD678, 0xEB3E, 0x58C0, 0xAC70, 0x5860, 0x5DC0, 0xAEF0, 0xD77C,
    0x5CE0, 0xAE78, 0xD73E, 0x5C70, 0xAE3C, 0x5EF0, 0xAF7C, 0x5E78,
    0xAF3E, 0x5F7C, 0xF5FA, 0xD2E0, 0xE978, 0xF4BE, 0xA4C0, 0xD270,
    0xE93C, 0xA460, 0xD238, 0x4840, 0xA430, 0xD21C, 0x4820, 0xA418,
    0x4810, 0xA6E0, 0xD378, 0xE9BE, 0x4CC0, 0xA670, 0xD33C, 0x4C60,
    0xA638, 0xD31E, 0x4C30, 0xA61C, 0x4EE0, 0xA778, 0xD3BE, 0x4E70,
    0xA73C, 0x4E38, 0xA71E, 0x4F78, 0xA7BE, 0x4F3C, 0x4F1E, 0xA2C0,
    0xD170, 0xE8BC, 0xA260, 0xD138, 0xE89E, 0x4440, 0xA230, 0xD11C,
    0x4420, 0xA218, 0x4410, 0x4408, 0x46C0, 0xA370, 0xD1BC, 0x4660,
    0xA338, 0xD19E, 0x4630, 0xA31C, 0x4618, 0x460C, 0x4770, 0xA3BC,
    0x4738, 0xA39E, 0x471C, 0x47BC, 0xA160, 0xD0B8, 0xE85E, 0x4240,
    0xA130, 0xD09C, 0x4220, 0xA118, 0xD08E, 0x4210, 0xA10C, 0x4208,
    0xA106, 0x4360, 0xA1B8, 0xD0DE, 0x4330, 0xA19C, 0x4318, 0xA18E,
    0x430C, 0x4306, 0xA1DE, 0x438E, 0x4140, 0xA0B0, 0xD05C, 0x4120,
    0xA098, 0xD04E, 0x4110, 0xA08C, 0x4108, 0xA086, 0x4104, 0x41B0,
    0x4198, 0x418C, 0x40A0, 0xD02E, 0x40D8, 0xA06E, 0x40CC, 0xA04C,
    0x40C6, 0x4082, 0x40EE, 0x4084, 0x4090, 0x8AC0, 0xC570, 0xE2BC,
    0x8A60, 0xC538, 0x1440, 0x8A30, 0xC51C, 0x1420, 0x8A18, 0x1410,
    0x1408, 0x16C0, 0x8B70, 0xC5BC, 0x1660, 0x8B38, 0xC59E, 0x1630,
    0x8B1C, 0x1618, 0x160C, 0x1770, 0x8BBC, 0x1738, 0x8B9E, 0x171C,
    0x17BC, 0x179E, 0x8960, 0xC4B8, 0xE25E, 0x1240, 0x8930, 0xC49C,
    0x1220, 0x8918, 0xC48E, 0x1210, 0x890C, 0x1208, 0x8906, 0x1360,
    0x89B8, 0xC4DE, 0x1330, 0x899C, 0x1318, 0x898E, 0x130C, 0x1306,
    0x13B8, 0x89DE, 0x139C, 0x138E, 0x13DE, 0x1140, 0x88B0, 0xC45C,
    0x1120, 0x8898, 0xC44E, 0x1110, 0x888C, 0x1108, 0x8886, 0x1104,
    0x1102, 0x11B0, 0x88DC, 0x1198, 0x88CE, 0x118C, 0x1186, 0x11DC,
    0x11CE, 0x10A0, 0x8858, 0xC42E, 0x1090, 0x884C, 0x1088, 0x8846,
    0x1084, 0x1082, 0x10D8, 0x886E, 0x10CC, 0x10C6, 0x10EE, 0x1050,
    0x882C, 0x1048, 0x8826, 0x1044, 0x1042, 0x106C, 0x1066, 0x8560,
    0xC2B8, 0xE15E, 0x0A40, 0x8530, 0xC29C, 0x0A20, 0x8518, 0xC28E,
    0x0A10, 0x850C, 0x0A08, 0x8506, 0x0B60, 0x85B8, 0xC2DE, 0x0B30,
    0x859C, 0x0B18, 0x858E, 0x0B0C, 0x0B06, 0x0BB8, 0x85DE, 0x0B9C,
    0x0B8E, 0x0BDE, 0x0940, 0x84B0, 0xC25C, 0x0920, 0x8498, 0xC24E,
    0x0910, 0x848C, 0x0908, 0x8486, 0x0904, 0x0902, 0x09B0, 0x84DC,
    0x0998, 0x84CE, 0x098C, 0x0986, 0x09DC, 0x09CE, 0x08A0, 0x8458,
    0xC22E, 0x0890, 0x844C, 0x0888, 0x8446, 0x0884, 0x0882, 0x08D8,
    0x846E, 0x08CC, 0x08C6, 0x08EE, 0x0850, 0x842C, 0x0848, 0x8426,
    0x0844, 0x0842, 0x086C, 0x0866, 0x0828, 0x8416, 0x0824, 0x8C12,
    0x0822, 0x0836, 0x0814, 0x0812, 0x8298, 0xC14E, 0x0510, 0x828C,
    0x0508, 0x8286, 0x0504, 0x0502, 0x05B0, 0x82DC, 0x0598, 0x82CE,
    0x058C, 0x0586, 0x05DC, 0x05CE, 0x04A0, 0x8258, 0xC12E, 0x0490,
    0x824C, 0x0488, 0x8246, 0x0484, 0x0482, 0x04D8, 0x826E, 0x04CC,
    0x04C6, 0x04EE, 0x0450, 0x822C, 0x0448, 0x8226, 0x0444, 0x0442,
    0x046C, 0x0466, 0x0428, 0x8216, 0x0424, 0x82B0, 0x0422, 0x0436,
    0x0414, 0xEA3C, 0xD438, 0xEA1E, 0xD41C, 0xA818, 0xD40E, 0xD63C,
    0xAC38, 0xD61E, 0x5830, 0xAC1C, 0x5818, 0xAC0E, 0x5C38, 0xAE1E,
    0x5C1C, 0x5C0E, 0x5E3C, 0x5E1E, 0xFAFA, 0x5F3E, 0xE91E, 0xD20E,
    0xA40C, 0x4C18, 0xA60E, 0x4C0C, 0x4E1C, 0x4E0E, 0x4FBE, 0xD10E,
    0xA20C, 0xA206, 0xA30E, 0x4606, 0x470E, 0x479E, 0x4204, 0x43B8,
    0x439C, 0x43DE, 0x4102, 0xA0DC, 0xA0CE, 0x4186, 0x41DC, 0x41CE,
    0xA058, 0x4088, 0xA046, 0xDAC0, 0xED70, 0xF6BC, 0xDA60, 0xED38,
    0xF69E, 0xB440, 0xDA30, 0xED1C, 0xB420, 0xDA18, 0xED0E, 0xB410,
    0xDA0C, 0xB408, 0xDA06, 0xB6C0, 0xDB70, 0xEDBC, 0xB660, 0xDB38,
    0xED9E, 0x6C40, 0xB630, 0xDB1C, 0x6C20, 0xB618, 0xDB0E, 0x6C10,
    0xB60C, 0x6C08, 0xB606, 0x6EC0, 0xB770, 0xDBBC, 0x6E60, 0xB738,
    0xDB9E, 0x6E30, 0xB71C, 0x6E18, 0xB70E, 0x6E0C, 0x6E06, 0x6F70,
    0xB7BC, 0x6F38, 0xB79E, 0x6F1C, 0x6F0E, 0x6FBC, 0x6F9E, 0xD960,
    0xECB8, 0xF65E, 0xB240, 0xD930, 0xEC9C, 0xB220, 0xD918, 0xEC8E,
    0xB210, 0xD90C, 0xB208, 0xD906, 0xB204, 0xB360, 0xD9B8, 0xECDE,
    0x6640, 0xB330, 0xD99C, 0x6620, 0xB318, 0xD98E, 0x6610, 0xB30C,
    0x6608, 0xB306, 0x6604, 0x6760, 0xB3B8, 0xD9DE, 0x6730, 0xB39C,
    0x6718, 0xB38E, 0x670C, 0x6706, 0x67B8, 0xB3DE, 0x679C, 0x678E,
    0x67DE, 0xB140, 0xD8B0, 0xEC5C, 0xB120, 0xD898, 0xEC4E, 0xB110,
    0xD88C, 0xB108, 0xD886, 0xB104, 0xB102, 0x6340, 0xB1B0, 0xD8DC,
    0x6320, 0xB198, 0xD8CE, 0x6310, 0xB18C, 0x6308, 0xB186, 0x6304,
    0x6302, 0x63B0, 0xB1DC, 0x6398, 0xB1CE, 0x638C, 0x6386, 0x63DC,
    0x63CE, 0xB0A0, 0xD858, 0xEC2E, 0xB090, 0xD84C, 0xB088, 0xD846,
    0xB084, 0xB082, 0x61A0, 0xB0D8, 0xD86E, 0x6190, 0xB0CC, 0x6188,
    0xB0C6, 0x6184, 0x6182, 0x61D8, 0xB0EE, 0x61CC, 0x61C6, 0x61EE,
    0xB050, 0xD82C, 0xB048, 0xD826, 0xB044, 0xB042, 0x60D0, 0xB06C,
    0x60C8, 0xB066, 0x60C4, 0x60C2, 0x60EC, 0x60E6, 0xB028, 0xD816,
    0xB024, 0xB022, 0x6068, 0xB036, 0x6064, 0x6062, 0x6076, 0xDD40,
    0xEEB0, 0xF75C, 0xDD20, 0xEE98, 0xF74E, 0xDD10, 0xEE8C, 0xDD08,
    0xEE86, 0xDD04, 0xDD02, 0xBB40, 0xDDB0, 0xEEDC, 0xBB20, 0xDD98,
    0xEECE, 0xBB10, 0xDD8C, 0xBB08, 0xDD86, 0xBB04, 0xBB02, 0x7740,
    0xBBB0, 0xDDDC, 0x7720, 0xBB98, 0xDDCE, 0x7710, 0xBB8C, 0x7708,
    0xBB86, 0x7704, 0x7702, 0x77B0, 0xBBDC, 0x7798, 0xBBCE, 0x778C,
    0x7786, 0x77DC, 0x77CE, 0xDCA0, 0xEE58, 0xF72E, 0xDC90, 0xEE4C,
    0xDC88, 0xEE46, 0xDC84, 0xDC82, 0xB9A0, 0xDCD8, 0xEE6E, 0xB990,
    0xDCCC, 0xB988, 0xDCC6, 0xB984, 0xB982, 0x73A0, 0xB9D8, 0xDCEE,
    0x7390, 0xB9CC, 0x7388, 0xB9C6, 0x7384, 0x7382, 0x73D8, 0xB9EE,
    0x73CC, 0x73C6, 0x73EE, 0xDC50, 0xEE2C, 0xDC48, 0xEE26, 0xDC44,
    0xDC42, 0xB8D0, 0xDC6C, 0xB8C8, 0xDC66, 0xB8C4, 0xB8C2, 0x71D0,
    0xB8EC, 0x71C8, 0xB8E6, 0x71C4, 0x71C2, 0x71EC, 0x71E6, 0xDC28,
    0xEE16, 0xDC24, 0xDC22, 0xB868, 0xDC36, 0xB864, 0xB862, 0x70E8,
    0xB876, 0x70E4, 0x70E2, 0x70F6, 0xDC14, 0xDC12, 0xB834, 0xB832,
    0x7074, 0x7072, 0xDC0A, 0xB81A, 0x703A, 0xEF50, 0xF7AC, 0xEF48,
    0xF7A6, 0xEF44, 0xEF42, 0xDED0, 0xEF6C, 0xDEC8, 0xEF66, 0xDEC4,
    0xDEC2, 0xBDD0, 0xDEEC, 0xBDC8, 0xDEE6, 0xBDC4, 0xBDC2, 0x7BD0,
    0xBDEC, 0x7BC8, 0xBDE6, 0x7BC4, 0x7BC2, 0x7BEC, 0x7BE6, 0xEF28,
    0xF796, 0xEF24, 0xEF22, 0xDE68, 0xEF36, 0xDE64, 0xDE62, 0xBCE8,
    0xDE76, 0xBCE4, 0xBCE2, 0x79E8, 0xBCF6, 0x79E4, 0x79E2, 0x79F6,
    0xEF14, 0xEF12, 0xDE34, 0xDE32, 0xBC74, 0xBC72, 0x78F4, 0x78F2,
    0xEF0A, 0xDE1A, 0xBC3A, 0x787A, 0x7D7E, 0xF7D4, 0xF7D2, 0xEFB4,
    0xEFB2, 0xDF74, 0xDF72, 0xBEF4, 0xBEF2, 0x7DF4, 0x7DF2, 0xF7CA,
    0xEF9A, 0xDF3A, 0xBE7A, 0x7CFA, 0x7EBE, 0xCAE0, 0xE578, 0xF2BE,
    0x94C0, 0xCA70, 0xE53C, 0x9460, 0xCA38, 0xE51E, 0x2840, 0x9430,
    0xCA1C, 0x2820, 0x9418, 0xCA0E, 0x2810, 0x940C, 0x96E0, 0xCB78,
    0xE5BE, 0x2CC0, 0x9670, 0xCB3C, 0x2C60, 0x9638, 0xCB1E, 0x2C30,
    0x961C, 0x2C18, 0x960E, 0x2C0C, 0x2EE0, 0x9778, 0xCBBE, 0x2E70,
    0x973C, 0x2E38, 0x971E, 0x2E1C, 0x2E0E, 0x2F78, 0x97BE, 0x2F3C,
    0x2F1E, 0x2FBE, 0x92C0, 0xC970, 0xE4BC, 0x9260, 0xC938, 0xE49E,
    0x2440, 0x9230, 0xC91C, 0x2420, 0x9218, 0xC90E, 0x2410, 0x920C,
    0x2408, 0x9206, 0x26C0, 0x9370, 0xC9BC, 0x2660, 0x9338, 0xC99E,
    0x2630, 0x931C, 0x2618, 0x930E, 0x260C, 0x2606, 0x2770, 0x93BC,
    0x2738, 0x939E, 0x271C, 0x270E, 0x27BC, 0x279E, 0x9160, 0xC8B8,
    0xE45E, 0x2240, 0x9130, 0xC89C, 0x2220, 0x9118, 0xC88E, 0x2210,
    0x910C, 0x2208, 0x9106, 0x2204, 0x2360, 0x91B8, 0xC8DE, 0x2330,
    0x919C, 0x2318, 0x918E, 0x230C, 0x2306, 0x23B8, 0x91DE, 0x239C,
    0x238E, 0x23DE, 0x2140, 0x90B0, 0xC85C, 0x2120, 0x9098, 0xC84E,
    0x2110, 0x908C, 0x2108, 0x9086, 0x2104, 0x2102, 0x21B0, 0x90DC,
    0x2198, 0x90CE, 0x218C, 0x2186, 0x21DC, 0x21CE, 0x20A0, 0x9058,
    0xC82E, 0x2090, 0x904C, 0x2088, 0x9046, 0x2084, 0x2082, 0x20D8,
    0x906E, 0x20CC, 0x20C6, 0x20EE, 0x2050, 0x902C, 0x2048, 0x9026,
    0x2044, 0xF560, 0xFAB8, 0xEA40, 0xF530, 0xFA9C, 0xEA20, 0xF518,
    0xFA8E, 0xEA10, 0xF50C, 0xEA08, 0xF506, 0xEA04, 0xEB60, 0xF5B8,
    0xFADE, 0xD640, 0xEB30, 0xF59C, 0xD620, 0xEB18, 0xF58E, 0xD610,
    0xEB0C, 0xD608, 0xEB06, 0xD604, 0xD760, 0xEBB8, 0xF5DE, 0xAE40,
    0xD730, 0xEB9C, 0xAE20, 0xD718, 0xEB8E, 0xAE10, 0xD70C, 0xAE08,
    0xD706, 0xAE04, 0xAF60, 0xD7B8, 0xEBDE, 0x5E40, 0xAF30, 0xD79C,
    0x5E20, 0xAF18, 0xD78E, 0x5E10, 0xAF0C, 0x5E08, 0xAF06, 0x5E04,
    0x5F60, 0xAFB8, 0xD7DE, 0x5F30, 0xAF9C, 0x5F18, 0xAF8E, 0x5F0C,
    0x5F06, 0x5F9C, 0x5FB8, 0xE940, 0xAFDE, 0x5F8E, 0xF4B0, 0xFA5C,
    0xE920, 0xF498, 0xFA4E, 0xE910, 0xF48C, 0xE908, 0xF486, 0xE904,
    0xE902, 0xD340, 0xE9B0, 0xF4DC, 0xD320, 0xE998, 0xF4CE, 0xD310,
    0xE98C, 0xD308, 0xE986, 0xD304, 0xD302, 0xA740, 0xD3B0, 0xD398,
    0xE9DC, 0xA710, 0xA720, 0xE9CE, 0xD38C, 0xA708, 0xD386, 0xA704,
    0xA702, 0x4F40, 0xA7B0, 0xD3DC, 0x4F20, 0xA798, 0xD3CE, 0x4F10,
    0xA78C, 0x4F08, 0xA786, 0x4F04, 0x4F02, 0x4FB0, 0xA7DC, 0x4F98,
    0xA7CE, 0x4F8C, 0x4F86, 0x4FDC, 0x4FCE, 0xE8A0, 0xF458, 0xFA2E,
    0xE890, 0xF44C, 0xE888, 0xF446, 0xE884, 0xE882, 0xD1A0, 0xE8D8,
    0xF46E, 0xD190, 0xE8CC, 0xD188, 0xE8C6, 0xD184, 0xD182, 0xA3A0,
    0xD1D8, 0xE8EE, 0xA390, 0xD1CC, 0xA388, 0xD1C6, 0xA384, 0xA382,
    0x47A0, 0xA3D8, 0xD1EE, 0x4790, 0xA3CC, 0x4788, 0xA3C6, 0x4784,
    0x4782, 0x47D8, 0xA3EE, 0x47CC, 0x47C6, 0x47EE, 0xE850, 0xF42C,
    0xE848, 0xF426, 0xE844, 0xE842, 0xD0D0, 0xE86C, 0xD0C8, 0xE866,
    0xD0C4, 0xD0C2, 0xA1D0, 0xD0EC, 0xA1C8, 0xD0E6, 0xA1C4, 0xA1C2,
    0x43D0, 0xA1EC, 0x43C8, 0xA1E6, 0x43C4, 0x43C2, 0x43EC, 0x43E6,
    0xE828, 0xF416, 0xE824, 0xE822, 0xD068, 0xE836, 0xD064, 0xD062,
    0xA0E8, 0xD076, 0xA0E4, 0xA0E2, 0x41E8, 0xA0F6, 0x41E4, 0x41E2,
    0x41F6, 0xE814, 0xE812, 0xD034, 0xD032, 0xA074, 0xA072, 0x40F4,
    0x40F2, 0x6BF0, 0xF6A0, 0xFB58, 0x69F8, 0xF690, 0xFB4C, 0x68FC,
    0xF688, 0xFB46, 0x687E, 0xF684, 0xF682, 0xEDA0, 0xF6D8, 0xFB6E,
    0xED90, 0xF6CC, 0xED88, 0xF6C6, 0xED84, 0xED82, 0xDBA0, 0xEDD8,
    0xF6EE, 0xDB90, 0xEDCC, 0xDB88, 0xEDC6, 0xDB84, 0xDB82, 0xB7A0,
    0xDBD8, 0xEDEE, 0xB790, 0xDBCC, 0xB788, 0xDBC6, 0xB784, 0xB782,
    0x6FA0, 0xB7D8, 0xDBEE, 0x6F90, 0xB7CC, 0x6F88, 0xB7C6, 0x6F84,
    0x6F82, 0x6FD8, 0xB7EE, 0x6FCC, 0x6FC6, 0x65F8, 0xF650, 0xFB2C,
    0x64FC, 0xF648, 0xFB26, 0x647E, 0xF644, 0xF642, 0xECD0, 0xF66C,
    0xECC8, 0xF666, 0xECC4, 0xECC2, 0xD9D0, 0xECEC, 0xD9C8, 0xECE6,
    0xD9C4, 0xD9C2, 0xB3D0, 0xD9EC, 0xB3C8, 0xD9E6, 0xB3C4, 0xB3C2,
    0x67D0, 0xB3EC, 0x67C8, 0xB3E6, 0x67C4, 0x67C2, 0x67EC, 0x67E6,
    0x62FC, 0xF628, 0xFB16, 0x627E, 0xF624, 0xF622, 0xEC68, 0xF636,
    0xEC64, 0xEC62, 0xD8E8, 0xEC76, 0xD8E4, 0xD8E2, 0xB1E8, 0xD8F6,
    0xB1E4, 0xB1E2, 0x63E8, 0xB1F6, 0x63E4, 0x63E2, 0x63F6, 0x617E,
    0xF614, 0xF612, 0xEC34, 0xEC32, 0xD874, 0xD872, 0xB0F4, 0xB0F2,
    0x61F4, 0x61F2, 0xF60A, 0xEC1A, 0xD83A, 0xB07A, 0x60FA, 0x75F0,
    0xBAFC, 0xFBA8, 0x74F8, 0xBA7E, 0xFBA4, 0x747C, 0xFBA2, 0x743E,
    0x76FC, 0xF768, 0xFBB6, 0x767E, 0xF764, 0xF762, 0xEEE8, 0xF776,
    0xEEE4, 0xEEE2, 0xDDE8, 0xEEF6, 0xDDE4, 0xDDE2, 0xBBE8, 0xDDF6,
    0xBBE4, 0xBBE2, 0x77E8, 0xBBF6, 0x77E4, 0x77E2, 0x72F8, 0xB97E,
    0xFB94, 0x727C, 0xFB92, 0x723E, 0x737E, 0xF734, 0xF732, 0xEE74,
    0xEE72, 0xDCF4, 0xDCF2, 0xB9F4, 0xB9F2, 0x73F4, 0x73F2, 0x717C,
    0xFB8A, 0x713E, 0xF71A, 0xEE3A, 0xDC7A, 0xB8FA, 0x71FA, 0x70BE,
    0x7AF0, 0xBD7C, 0x7A78, 0xBD3E, 0x7A3C, 0x7A1E, 0x7B7C, 0xFBDA,
    0x7B3E, 0xF7BA, 0xEF7A, 0xDEFA, 0xBDFA, 0x7978, 0xBCBE, 0x793C,
    0x791E, 0x79BE, 0x78BC, 0x789E, 0x785E, 0x7D70, 0xBEBC, 0x7D38,
    0xBE9E, 0x7D1C, 0x7D0E, 0x7DBC, 0x7D9E, 0x7CB8, 0xBE5E, 0x7C9C,
    0x7C8E, 0x7CDE, 0x7C5C, 0x7C4E, 0x7C2E, 0x7EB0, 0xBF5C, 0x7E98,
    0xBF4E, 0x7E8C, 0x7E86, 0x7EDC, 0x7ECE, 0x7E58, 0xBF2E, 0x7E4C,
    0x7E46, 0x7E6E, 0x7E2C, 0x7E26, 0x7E16, 0xE540, 0xF2B0, 0xF95C,
    0xE520, 0xF298, 0xF94E, 0xE510, 0xF28C, 0xE508, 0xF286, 0xE504,
    0xE502, 0xCB40, 0xE5B0, 0xF2DC, 0xCB20, 0xE598, 0xF2CE, 0xCB10,
    0xE58C, 0xCB08, 0xE586, 0xCB04, 0xCB02, 0x9740, 0xCBB0, 0xE5DC,
    0x9720, 0xCB98, 0xE5CE, 0x9710, 0xCB8C, 0x9708, 0xCB86, 0x9704,
    0x9702, 0x2F40, 0x97B0, 0xCBDC, 0x2F20, 0x9798, 0xCBCE, 0x2F10,
    0x978C, 0x2F08, 0x9786, 0x2F04, 0x2F02, 0x2FB0, 0x97DC, 0x2F98,
    0x97CE, 0x2F8C, 0x2F86, 0x2FDC, 0x2FCE, 0xE4A0, 0xF258, 0xF92E,
    0xE490, 0xF24C, 0xE488, 0xF246, 0xE484, 0xE482, 0xC9A0, 0xE4D8,
    0xF26E, 0xC990, 0xE4CC, 0xC988, 0xE4C6, 0xC984, 0xC982, 0x93A0,
    0xC9D8, 0xE4EE, 0x9390, 0xC9CC, 0x9388, 0xC9C6, 0x9384, 0x9382,
    0x27A0, 0x93D8, 0xC9EE, 0x2790, 0x93CC, 0x2788, 0x93C6, 0x2784,
    0x2782, 0x27D8, 0x93EE, 0x27CC, 0x27C6, 0x27EE, 0xE450, 0xF22C,
    0xE448, 0xF226, 0xE444, 0xE442, 0xC8D0, 0xE46C, 0xC8C8, 0xE466,
    0xC8C4, 0xC8C2, 0x91D0, 0xC8EC, 0x91C8, 0xC8E6, 0x91C4, 0x91C2,
    0x23D0, 0x91EC, 0x23C8, 0x91E6, 0x23C4, 0x23C2, 0x23EC, 0x23E6,
    0xE428, 0xF216, 0xE424, 0xE422, 0xC868, 0xE436, 0xC864, 0xC862,
    0x90E8, 0xC876, 0x90E4, 0x90E2, 0x21E8, 0x90F6, 0x21E4, 0x21E2,
    0x21F6, 0xE414, 0xE412, 0xC834, 0xC832, 0x9074, 0x9072, 0x20F4,
    0x20F2, 0xE40A, 0xC81A, 0x903A, 0x207A, 0x35F8, 0xF350, 0xF9AC,
    0x34FC, 0xF348, 0xF9A6, 0x347E, 0xF344, 0xF342, 0xE6D0, 0xF36C,
    0xE6C8, 0xF366, 0xE6C4, 0xE6C2, 0xCDD0, 0xE6EC, 0xCDC8, 0xE6E6,
    0xCDC4, 0xCDC2, 0x9BD0, 0xCDEC, 0x9BC8, 0xCDE6, 0x9BC4, 0x9BC2,
    0x37D0, 0x9BEC, 0x37C8, 0x9BE6, 0x37C4, 0x37C2, 0x37EC, 0x37E6,
    0x32FC, 0xF328, 0xF996, 0x327E, 0xF324, 0xF322, 0xE668, 0xF336,
    0xE664, 0xE662, 0xCCE8, 0xE676, 0xCCE4, 0xCCE2, 0x99E8, 0xCCF6,
    0x99E4, 0x99E2, 0x33E8, 0x99F6, 0x33E4, 0x33E2, 0x33F6, 0x317E,
    0xF314, 0xF312, 0xE634, 0xE632, 0xCC74, 0xCC72, 0x98F4, 0x98F2,
    0x31F4, 0x31F2, 0xF30A, 0xE61A, 0xCC3A, 0x987A, 0x30FA, 0x3AF8,
    0x9D7E, 0xF9D4, 0x3A7C, 0xF9D2, 0x3A3E, 0x3B7E, 0xF3B4, 0xF3B2,
    0xE774, 0xE772, 0xCEF4, 0xCEF2, 0x9DF4, 0x9DF2, 0x3BF4, 0x3BF2,
    0x397C, 0xF9CA, 0x393E, 0xF39A, 0xE73A, 0xCE7A, 0x9CFA, 0x39FA,
    0x38BE, 0x3D78, 0x9EBE, 0x3D3C, 0x3D1E, 0x3DBE, 0x3CBC, 0x3C9E,
    0x3C5E, 0x3EB8, 0x9F5E, 0x3E9C, 0x3E8E, 0x3EDE, 0x3E5C, 0x3E4E,
    0x3E2E, 0x3F58, 0x9FAE, 0x3F4C, 0x3F46, 0x3F6E, 0x3F2C, 0x3F26,
    0x3F16, 0xE2A0, 0xF158, 0xF8AE, 0xE290, 0xF14C, 0xE288, 0xF146,
    0xE284, 0xE282, 0xC5A0, 0xE2D8, 0xF16E, 0xC590, 0xE2CC, 0xC588,
    0xE2C6, 0xC584, 0xC582, 0x8BA0, 0xC5D8, 0xE2EE, 0x8B90, 0xC5CC,
    0x8B88, 0xC5C6, 0x8B84, 0x8B82, 0x17A0, 0x8BD8, 0xC5EE, 0x1790,
    0x8BCC, 0x1788, 0x8BC6, 0x1784, 0x1782, 0x17D8, 0x8BEE, 0x17CC,
    0x17C6, 0x17EE, 0xE250, 0xF12C, 0xE248, 0xF126, 0xE244, 0xE242,
    0xC4D0, 0xE26C, 0xC4C8, 0xE266, 0xC4C4, 0xC4C2, 0x89D0, 0xC4EC,
    0x89C8, 0xC4E6, 0x89C4, 0x89C2, 0x13D0, 0x89EC, 0x13C8, 0x89E6,
    0x13C4, 0x13C2, 0x13EC, 0x13E6, 0xE228, 0xF116, 0xE224, 0xE222,
    0xC468, 0xE236, 0xC464, 0xC462, 0x88E8, 0xC476, 0x88E4, 0x88E2,
    0x11E8, 0x88F6, 0x11E4, 0x11E2, 0x11F6, 0xE214, 0xE212, 0xC434,
    0xC432, 0x8874, 0x8872, 0x10F4, 0x10F2, 0xE20A, 0xC41A, 0x883A,
    0x107A, 0x1AFC, 0xF1A8, 0xF8D6, 0x1A7E, 0xF1A4, 0xF1A2, 0xE368,
    0xF1B6, 0xE364, 0xE362, 0xC6E8, 0xE376, 0xC6E4, 0xC6E2, 0x8DE8,
    0xC6F6, 0x8DE4, 0x8DE2, 0x1BE8, 0x8DF6, 0x1BE4, 0x1BE2, 0x1BF6,
    0x197E, 0xF194, 0xF192, 0xE334, 0xE332, 0xC674, 0xC672, 0x8CF4,
    0x8CF2, 0x19F4, 0x19F2, 0xF18A, 0xE31A, 0xC63A, 0x8C7A, 0x18FA,
    0x1D7C, 0xF8EA, 0x1D3E, 0xF1DA, 0xE3BA, 0xC77A, 0x8EFA, 0x1DFA,
    0x1CBE, 0x1EBC, 0x1E9E, 0x1E5E, 0x1F5C, 0x1F4E, 0x1F2E, 0x1FAC,
    0x1FA6, 0x1F96, 0xE150, 0xF0AC, 0xE148, 0xF0A6, 0xE144, 0xE142,
    0xC2D0, 0xE16C, 0xC2C8, 0xE166, 0xC2C4, 0xC2C2, 0x85D0, 0xC2EC,
    0x85C8, 0xC2E6, 0x85C4, 0x85C2, 0x0BD0, 0x85EC, 0x0BC8, 0x85E6,
    0x0BC4, 0x0BC2, 0x0BEC, 0x0BE6, 0xE128, 0xF096, 0xE124, 0xE122,
    0xC268, 0xE136, 0xC264, 0xC262, 0x84E8, 0xC276, 0x84E4, 0x84E2,
    0x09E8, 0x84F6, 0x09E4, 0x09E2, 0x09F6, 0xE114, 0xE112, 0xC234,
    0xC232, 0x8474, 0xABE0, 0xD5F8, 0x53C0, 0xA9F0, 0xD4FC, 0x51E0,
    0xA8F8, 0xD47E, 0x50F0, 0xA87C, 0x5078, 0xA83E, 0x503C, 0x5BE0,
    0xADF8, 0xFAD0, 0x59F0, 0xACFC, 0xFAC8, 0x58F8, 0xAC7E, 0xFAC4,
    0x587C, 0xFAC2, 0x583E, 0x5DF8, 0xF5D0, 0xFAEC, 0x5CFC, 0xF5C8,
    0xFAE6, 0xEBD0, 0x5C7E, 0xF5C4, 0xF5C2, 0xF5EC, 0xEBC2, 0xEBC8,
    0xF5E6, 0xEBC4, 0xD7D0, 0xEBEC, 0xD7C8, 0xEBE6, 0xD7C4, 0xD7C2,
    0xAFD0, 0xD7EC, 0xAFC8, 0xD7E6, 0xAFC4, 0xAFC2, 0x4BC0, 0xA5F0,
    0xD2FC, 0x49E0, 0xA4F8, 0xD27E, 0x48F0, 0xA47C, 0x4878, 0xA6FC,
    0xA43E, 0x483C, 0x481E, 0x4DF0, 0x4C7C, 0xFA68, 0x4CF8, 0xA67E,
    0xFA64, 0xFA62, 0x4C3E, 0x4EFC, 0xF4E8, 0xFA76, 0x4E7E, 0xF4E4,
    0xF4E2, 0xE9E8, 0xF4F6, 0xE9E4, 0xE9E2, 0xD3E8, 0xE9F6, 0xD3E4,
    0xD3E2, 0xA7E8, 0xD3F6, 0xA7E4, 0xA7E2, 0x4478, 0x45E0, 0xA2F8,
    0xD17E, 0x44F0, 0x46F8, 0xA27C, 0xA23E, 0x443C, 0x441E, 0xA37E,
    0xFA34, 0x467C, 0xFA32, 0x463E, 0x477E, 0xF474, 0xF472, 0xE8F4,
    0xE8F2, 0xD1F4, 0xD1F2, 0xA3F4, 0xA3F2, 0x42F0, 0xA17C, 0x4278,
    0xA13E, 0x423C, 0x421E, 0x437C, 0xFA1A, 0x433E, 0xF43A, 0xE87A,
    0xD0FA, 0xA1FA, 0x4178, 0xA0BE, 0x413C, 0x411E, 0x41BE, 0x40BC,
    0x409E, 0xB5E0, 0xDAF8, 0xED7E, 0x69C0, 0xB4F0, 0xDA7C, 0x68E0,
    0xB478, 0xDA3E, 0x6870, 0xB43C, 0x6838, 0xB41E, 0x681C, 0x6DE0,
    0xB6F8, 0xDB7E, 0x6CF0, 0xB67C, 0x6C78, 0xB63E, 0x6C3C, 0x6C1E,
    0x6EF8, 0xB77E, 0xFB74, 0x6E7C, 0xFB72, 0x6E3E, 0x6F7E, 0xF6F4,
    0xF6F2, 0xEDF4, 0xEDF2, 0xDBF4, 0xDBF2, 0x65C0, 0xB2F0, 0xD97C,
    0x64E0, 0xB278, 0xD93E, 0x6470, 0xB23C, 0x6438, 0xB21E, 0x641C,
    0x640E, 0x66F0, 0xB37C, 0x6678, 0xB33E, 0x663C, 0x661E, 0x677C,
    0xFB3A, 0x673E, 0xF67A, 0xECFA, 0xD9FA, 0x62E0, 0xB178, 0xD8BE,
    0x6270, 0xB13C, 0x6238, 0xB11E, 0x621C, 0x620E, 0x6378, 0xB1BE,
    0x633C, 0x631E, 0x63BE, 0x6170, 0xB0BC, 0x6138, 0xB09E, 0x611C,
    0x610E, 0x61BC, 0x619E, 0x60B8, 0xB05E, 0x609C, 0x608E, 0x60DE,
    0x605C, 0x604E, 0xBAE0, 0xDD78, 0xEEBE, 0x74C0, 0xBA70, 0xDD3C,
    0x7460, 0xBA38, 0xDD1E, 0x7430, 0xBA1C, 0x7418, 0xBA0E, 0x740C,
    0x76E0, 0xBB78, 0xDDBE, 0x7670, 0xBB3C, 0x7638, 0xBB1E, 0x761C,
    0x760E, 0x7778, 0xBBBE, 0x773C, 0x771E, 0x77BE, 0x72C0, 0xB970,
    0xDCBC, 0x7260, 0xB938, 0xDC9E, 0x7230, 0xB91C, 0x7218, 0xB90E,
    0x720C, 0x7206, 0x7370, 0xB9BC, 0x7338, 0xB99E, 0x731C, 0x730E,
    0x73BC, 0x739E, 0x7160, 0xB8B8, 0xDC5E, 0x7130, 0xB89C, 0x7118,
    0xB88E, 0x710C, 0x7106, 0x71B8, 0xB8DE, 0x719C, 0x718E, 0x71DE,
    0x70B0, 0xB85C, 0x7098, 0xB84E, 0x708C, 0x7086, 0x70DC, 0x70CE,
    0x7058, 0xB82E, 0x704C, 0x7046, 0x706E, 0x702C, 0x7026, 0xBD60,
    0xDEB8, 0xEF5E, 0x7A40, 0xBD30, 0xDE9C, 0x7A20, 0xBD18, 0xDE8E,
    0x7A10, 0xBD0C, 0x7A08, 0xBD06, 0x7A04, 0x7B60, 0xBDB8, 0xDEDE,
    0x7B30, 0xBD9C, 0x7B18, 0xBD8E, 0x7B0C, 0x7B06, 0x7BB8, 0xBDDE,
    0x7B9C, 0x7B8E, 0x7BDE, 0x7940, 0xBCB0, 0xDE5C, 0x7920, 0xBC98,
    0xDE4E, 0x7910, 0xBC8C, 0x7908, 0xBC86, 0x7904, 0x7902, 0x79B0,
    0xBCDC, 0x7998, 0xBCCE, 0x798C, 0x7986, 0x79DC, 0x79CE, 0x78A0,
    0xBC58, 0xDE2E, 0x7890, 0xBC4C, 0x7888, 0xBC46, 0x7884, 0x7882,
    0x78D8, 0xBC6E, 0x78CC, 0x78C6, 0x78EE, 0x7850, 0xBC2C, 0x7848,
    0xBC26, 0x7844, 0x7842, 0x786C, 0x7866, 0x7828, 0xBC16, 0x7824,
    0x7822, 0x7836, 0x7814, 0x7812, 0xBEA0, 0xDF58, 0xEFAE, 0xBE90,
    0xDF4C, 0xBE88, 0xDF46, 0xBE84, 0xBE82, 0x7DA0, 0xBED8, 0xDF6E,
    0x7D90, 0xBECC, 0x7D88, 0xBEC6, 0x7D84, 0x7D82, 0x7DD8, 0xBEEE,
    0x7DCC, 0x7DC6, 0x7DEE, 0xBE50, 0xDF2C, 0xBE48, 0xDF26, 0xBE44,
    0xBE42, 0x7CD0, 0xBE6C, 0x7CC8, 0xBE66, 0x7CC4, 0x7CC2, 0x7CEC,
    0x7CE6, 0xBE28, 0xDF16, 0xBE24, 0xBE22, 0x7C68, 0xBE36, 0x7C64,
    0x7C62, 0x7C76, 0xBE14, 0xBE12, 0x7C34, 0x7C32, 0xBE0A, 0x7C1A,
    0xDFA8, 0xEFD6, 0xDFA4, 0xDFA2, 0xBF68, 0xDFB6, 0xBF64, 0xBF62,
    0x7EE8, 0xBF76, 0x7EE4, 0x7EE2, 0x7EF6, 0xDF94, 0xDF92, 0xBF34,
    0xBF32, 0x7E74, 0x7E72, 0xDF8A, 0xBF1A, 0x7E3A, 0x2BC0, 0x95F0,
    0xCAFC, 0x29E0, 0x94F8, 0xCA7E, 0x28F0, 0x947C, 0x2878, 0x943E,
    0x283C, 0x281E, 0x2DF0, 0x96FC, 0xF968, 0x2CF8, 0x967E, 0xF964,
    0x2C7C, 0xF962, 0x2C3E, 0x2EFC, 0xF2E8, 0xF976, 0x2E7E, 0xF2E4,
    0xF2E2, 0xE5E8, 0xF2F6, 0xE5E4, 0xE5E2, 0xCBE8, 0xE5F6, 0xCBE4,
    0xCBE2, 0x97E8, 0xCBF6, 0x97E4, 0x97E2, 0x25E0, 0x92F8, 0xC97E,
    0x24F0, 0x927C, 0x2478, 0x923E, 0x243C, 0x241E, 0x26F8, 0x937E,
    0xF934, 0x267C, 0xF932, 0x263E, 0x277E, 0xF274, 0xF272, 0xE4F4,
    0xE4F2, 0xC9F4, 0xC9F2, 0x93F4, 0x93F2, 0x22F0, 0x917C, 0x2278,
    0x913E, 0x223C, 0x221E, 0x237C, 0xF91A, 0x233E, 0xF23A, 0xE47A,
    0xC8FA, 0x91FA, 0x2178, 0x90BE, 0x213C, 0x211E, 0x21BE, 0x20BC,
    0x209E, 0x205E, 0x35C0, 0x9AF0, 0xCD7C, 0x34E0, 0x9A78, 0xCD3E,
    0x3470, 0x9A3C, 0x3438, 0x9A1E, 0x341C, 0x340E, 0x36F0, 0x9B7C,
    0x3678, 0x9B3E, 0x363C, 0x361E, 0x377C, 0xF9BA, 0x373E, 0xF37A,
    0xE6FA, 0xCDFA, 0x32E0, 0x9978, 0xCCBE, 0x3270, 0x993C, 0x3238,
    0x991E, 0x321C, 0x320E, 0x3378, 0x99BE, 0x333C, 0x331E, 0x33BE,
    0x3170, 0x98BC, 0x3138, 0x989E, 0x311C, 0x310E, 0x31BC, 0x319E,
    0x30B8, 0x985E, 0x309C, 0x308E, 0x30DE, 0x305C, 0x304E, 0x302E,
    0x3AC0, 0x9D70, 0xCEBC, 0x3A60, 0x9D38, 0xCE9E, 0x3A30, 0x9D1C,
    0x3A18, 0x9D0E, 0x3A0C, 0x3A06, 0x3B70, 0x9DBC, 0x3B38, 0x9D9E,
    0x3B1C, 0x3B0E, 0x3BBC, 0x3B9E, 0x3960, 0x9CB8, 0xCE5E, 0x3930,
    0x9C9C, 0x3918, 0x9C8E, 0x390C, 0x3906, 0x39B8, 0x9CDE, 0x399C,
    0x398E, 0x39DE, 0x38B0, 0x9C5C, 0x3898, 0x9C4E, 0x388C, 0x3886,
    0x38DC, 0x38CE, 0x3858, 0x9C2E, 0x384C, 0x3846, 0x386E, 0x382C,
    0x3826, 0x3816, 0x3D40, 0x9EB0, 0xCF5C, 0x3D20, 0x9E98, 0xCF4E,
    0x3D10, 0x9E8C, 0x3D08, 0x9E86, 0x3D04, 0x3D02, 0x3DB0, 0x9EDC,
    0x3D98, 0x9ECE, 0x3D8C, 0x3D86, 0x3DDC, 0x3DCE, 0x3CA0, 0x9E58,
    0xCF2E, 0x3C90, 0x9E4C, 0x3C88, 0x9E46, 0x3C84, 0x3C82, 0x3CD8,
    0x9E6E, 0x3CCC, 0x3CC6, 0x3CEE, 0x3C50, 0x9E2C, 0x3C48, 0x9E26,
    0x3C44, 0x3C42, 0x3C6C, 0x3C66, 0x3C28, 0x9E16, 0x3C24, 0x3C22,
    0x3C36, 0x3C14, 0x3C12, 0x3C0A, 0x9F50, 0xCFAC, 0x9F48, 0xCFA6,
    0x9F44, 0x9F42, 0x3ED0, 0x9F6C, 0x3EC8, 0x9F66, 0x3EC4, 0x3EC2,
    0x3EEC, 0x3EE6, 0x9F28, 0xCF96, 0x9F24, 0x9F22, 0x3E68, 0x9F36,
    0x3E64, 0x3E62, 0x3E76, 0x9F14, 0x9F12, 0x3E34, 0x3E32, 0x9F0A,
    0x3E1A, 0xCFD4, 0xCFD2, 0x9FB4, 0x9FB2, 0x3F74, 0x3F72, 0xCFCA,
    0x9F9A, 0x3F3A, 0x15E0, 0x8AF8, 0xC57E, 0x14F0, 0x8A7C, 0x1478,
    0x8A3E, 0x143C, 0x141E, 0x16F8, 0x8B7E, 0xF8B4, 0x167C, 0xF8B2,
    0x163E, 0x177E, 0xF174, 0xF172, 0xE2F4, 0xE2F2, 0xC5F4, 0xC5F2,
    0x8BF4, 0x8BF2, 0x12F0, 0x897C, 0x1278, 0x893E, 0x123C, 0x121E,
    0x137C, 0xF89A, 0x133E, 0xF13A, 0xE27A, 0xC4FA, 0x89FA, 0x1178,
    0x88BE, 0x113C, 0x111E, 0x11BE, 0x10BC, 0x109E, 0x105E, 0x1AE0,
    0x8D78, 0xC6BE, 0x1A70, 0x8D3C, 0x1A38, 0x8D1E, 0x1A1C, 0x1A0E,
    0x1B78, 0x8DBE, 0x1B3C, 0x1B1E, 0x1BBE, 0x1970, 0x8CBC, 0x1938,
    0x8C9E, 0x191C, 0x190E, 0x19BC, 0x199E, 0x18B8, 0x8C5E, 0x189C,
    0x188E, 0x18DE, 0x185C, 0x184E, 0x182E, 0x1D60, 0x8EB8, 0xC75E,
    0x1D30, 0x8E9C, 0x1D18, 0x8E8E, 0x1D0C, 0x1D06, 0x1DB8, 0x8EDE,
    0x1D9C, 0x1D8E, 0x1DDE, 0x1CB0, 0x8E5C, 0x1C98, 0x8E4E, 0x1C8C,
    0x1C86, 0x1CDC, 0x1CCE, 0x1C58, 0x8E2E, 0x1C4C, 0x1C46, 0x1C6E,
    0x1C2C, 0x1C26, 0x1C16, 0x1EA0, 0x8F58, 0xC7AE, 0x1E90, 0x8F4C,
    0x1E88, 0x8F46, 0x1E84, 0x1E82, 0x1ED8, 0x8F6E, 0x1ECC, 0x1EC6,
    0x1EEE, 0x1E50, 0x8F2C, 0x1E48, 0x8F26, 0x1E44, 0x1E42, 0x1E6C,
    0x1E66, 0x1E28, 0x8F16, 0x1E24, 0x1E22, 0x1E36, 0x1E14, 0x1E12,
    0x1E0A, 0x8FA8, 0xC7D6, 0x8FA4, 0x8FA2, 0x1F68, 0x8FB6, 0x1F64,
    0x1F62, 0x1F76, 0x8F94, 0x8F92, 0x1F34, 0x1F32, 0x8F8A, 0x1F1A,
    0xC7EA, 0x8FDA, 0x1FBA, 0x0AF0, 0x857C, 0x0A78, 0x853E, 0x0A3C,
    0x0A1E, 0x0B7C, 0xF85A, 0x0B3E, 0xF0BA, 0xE17A, 0xC2FA, 0x85FA,
    0x0978, 0x84BE, 0x093C, 0x091E, 0x09BE, 0x08BC, 0x089E, 0x085E,
    0x0D70, 0x86BC, 0x0D38, 0x869E, 0x0D1C, 0x0D0E, 0x0DBC, 0x0D9E,
    0x0CB8, 0x865E, 0x0C9C, 0x0C8E, 0x0CDE, 0x0C5C, 0x0C4E, 0x0C2E,
    0x0EB0, 0x875C, 0x0E98, 0x874E, 0x0E8C, 0x0E86, 0x0EDC, 0x0ECE,
    0x0E58, 0x872E, 0x0E4C,
];

pub const ECC_L0: [u16; 2] = [
    27, 917,
];

pub const ECC_L1: [u16; 4] = [
    522, 568, 723, 809,
];

pub const ECC_L2: [u16; 8] = [
    237, 308, 436, 284, 646, 653, 428, 379,
];

pub const ECC_L3: [u16; 16] = [
    274, 562, 232, 755, 599, 524, 801, 132, 295, 116, 442, 428, 295, 42, 176, 65,
];

pub const ECC_L4: [u16; 32] = [
    361, 575, 922, 525, 176, 586, 640, 321, 536, 742, 677, 742, 687, 284, 193, 517,
    273, 494, 263, 147, 593, 800, 571, 320, 803, 133, 231, 390, 685, 330, 63, 410,
];

pub const ECC_L5: [u16; 64] = [
    539, 422, 6, 93, 862, 771, 453, 106, 610, 287, 107, 505, 733, 877, 381, 612,
    723, 476, 462, 172, 430, 609, 858, 822, 543, 376, 511, 400, 672, 762, 283, 184,
    440, 35, 519, 31, 460, 594, 225, 535, 517, 352, 605, 158, 651, 201, 488, 502,
    648, 733, 717, 83, 404, 97, 280, 771, 840, 629, 4, 381, 843, 623, 264, 543,
];

pub const ECC_L6: [u16; 128] = [
    521, 310, 864, 547, 858, 580, 296, 379, 53, 779, 897, 444, 400, 925, 749, 415,
    822, 93, 217, 208, 928, 244, 583, 620, 246, 148, 447, 631, 292, 908, 490, 704,
    516, 258, 457, 907, 594, 723, 674, 292, 272, 96, 684, 432, 686, 606, 860, 569,
    193, 219, 129, 186, 236, 287, 192, 775, 278, 173, 40, 379, 712, 463, 646, 776,
    171, 491, 297, 763, 156, 732, 95, 270, 447, 90, 507, 48, 228, 821, 808, 898,
    784, 663, 627, 378, 382, 262, 380, 602, 754, 336, 89, 614, 87, 432, 670, 616,
    157, 374, 242, 726, 600, 269, 375, 898, 845, 454, 354, 130, 814, 587, 804, 34,
    211, 330, 539, 297, 827, 865, 37, 517, 834, 315, 550, 86, 801, 4, 108, 539,
];

pub const ECC_L7: [u16; 256] = [
    524, 894, 75, 766, 882, 857, 74, 204, 82, 586, 708, 250, 905, 786, 138, 720,
    858, 194, 311, 913, 275, 190, 375, 850, 438, 733, 194, 280, 201, 280, 828, 757,
    710, 814, 919, 89, 68, 569, 11, 204, 796, 605, 540, 913, 801, 700, 799, 137,
    439, 418, 592, 668, 353, 859, 370, 694, 325, 240, 216, 257, 284, 549, 209, 884,
    315, 70, 329, 793, 490, 274, 877, 162, 749, 812, 684, 461, 334, 376, 849, 521,
    307, 291, 803, 712, 19, 358, 399, 908, 103, 511, 51, 8, 517, 225, 289, 470,
    637, 731, 66, 255, 917, 269, 463, 830, 730, 433, 848, 585, 136, 538, 906, 90,
    2, 290, 743, 199, 655, 903, 329, 49, 802, 580, 355, 588, 188, 462, 10, 134,
    628, 320, 479, 130, 739, 71, 263, 318, 374, 601, 192, 605, 142, 673, 687, 234,
    722, 384, 177, 752, 607, 640, 455, 193, 689, 707, 805, 641, 48, 60, 732, 621,
    895, 544, 261, 852, 655, 309, 697, 755, 756, 60, 231, 773, 434, 421, 726, 528,
    503, 118, 49, 795, 32, 144, 500, 238, 836, 394, 280, 566, 319, 9, 647, 550,
    73, 914, 342, 126, 32, 681, 331, 792, 620, 60, 609, 441, 180, 791, 893, 754,
    605, 383, 228, 749, 760, 213, 54, 297, 134, 54, 834, 299, 922, 191, 910, 532,
    609, 829, 189, 20, 167, 29, 872, 449, 83, 402, 41, 656, 505, 579, 481, 173,
    404, 251, 688, 95, 497, 555, 642, 543, 307, 159, 924, 558, 648, 55, 497, 10,
];

pub const ECC_L8: [u16; 512] = [
    352, 77, 373, 504, 35, 599, 428, 207, 409, 574, 118, 498, 285, 380, 350, 492,
    197, 265, 920, 155, 914, 299, 229, 643, 294, 871, 306, 88, 87, 193, 352, 781,
    846, 75, 327, 520, 435, 543, 203, 666, 249, 346, 781, 621, 640, 268, 794, 534,
    539, 781, 408, 390, 644, 102, 476, 499, 290, 632, 545, 37, 858, 916, 552, 41,
    542, 289, 122, 272, 383, 800, 485, 98, 752, 472, 761, 107, 784, 860, 658, 741,
    290, 204, 681, 407, 855, 85, 99, 62, 482, 180, 20, 297, 451, 593, 913, 142,
    808, 684, 287, 536, 561, 76, 653, 899, 729, 567, 744, 390, 513, 192, 516, 258,
    240, 518, 794, 395, 768, 848, 51, 610, 384, 168, 190, 826, 328, 596, 786, 303,
    570, 381, 415, 641, 156, 237, 151, 429, 531, 207, 676, 710, 89, 168, 304, 402,
    40, 708, 575, 162, 864, 229, 65, 861, 841, 512, 164, 477, 221, 92, 358, 785,
    288, 357, 850, 836, 827, 736, 707, 94, 8, 494, 114, 521, 2, 499, 851, 543,
    152, 729, 771, 95, 248, 361, 578, 323, 856, 797, 289, 51, 684, 466, 533, 820,
    669, 45, 902, 452, 167, 342, 244, 173, 35, 463, 651, 51, 699, 591, 452, 578,
    37, 124, 298, 332, 552, 43, 427, 119, 662, 777, 475, 850, 764, 364, 578, 911,
    283, 711, 472, 420, 245, 288, 594, 394, 511, 327, 589, 777, 699, 688, 43, 408,
    842, 383, 721, 521, 560, 644, 714, 559, 62, 145, 873, 663, 713, 159, 672, 729,
    624, 59, 193, 417, 158, 209, 563, 564, 343, 693, 109, 608, 563, 365, 181, 772,
    677, 310, 248, 353, 708, 410, 579, 870, 617, 841, 632, 860, 289, 536, 35, 777,
    618, 586, 424, 833, 77, 597, 346, 269, 757, 632, 695, 751, 331, 247, 184, 45,
    787, 680, 18, 66, 407, 369, 54, 492, 228, 613, 830, 922, 437, 519, 644, 905,
    789, 420, 305, 441, 207, 300, 892, 827, 141, 537, 381, 662, 513, 56, 252, 341,
    242, 797, 838, 837, 720, 224, 307, 631, 61, 87, 560, 310, 756, 665, 397, 808,
    851, 309, 473, 795, 378, 31, 647, 915, 459, 806, 590, 731, 425, 216, 548, 249,
    321, 881, 699, 535, 673, 782, 210, 815, 905, 303, 843, 922, 281, 73, 469, 791,
    660, 162, 498, 308, 155, 422, 907, 817, 187, 62, 16, 425, 535, 336, 286, 437,
    375, 273, 610, 296, 183, 923, 116, 667, 751, 353, 62, 366, 691, 379, 687, 842,
    37, 357, 720, 742, 330, 5, 39, 923, 311, 424, 242, 749, 321, 54, 669, 316,
    342, 299, 534, 105, 667, 488, 640, 672, 576, 540, 316, 486, 721, 610, 46, 656,
    447, 171, 616, 464, 190, 531, 297, 321, 762, 752, 533, 175, 134, 14, 381, 433,
    717, 45, 111, 20, 596, 284, 736, 138, 646, 411, 877, 669, 141, 919, 45, 780,
    407, 164, 332, 899, 165, 726, 600, 325, 498, 655, 357, 752, 768, 223, 849, 647,
    63, 310, 863, 251, 366, 304, 282, 738, 675, 410, 389, 244, 31, 121, 303, 263,
];

/// Error correction coefficients for MicroPDF417, concatenated by level:
/// k=7 to k=16, then k=18, 21, 26, 32, 38, 44 and 50.
pub const M_PDF417_COEFFS: [u16; 344] = [
    76, 925, 537, 597, 784, 691, 437, 237, 308, 436, 284, 646, 653, 428, 379, 567,
    527, 622, 257, 289, 362, 501, 441, 205, 377, 457, 64, 244, 826, 841, 818, 691,
    266, 612, 462, 45, 565, 708, 825, 213, 15, 68, 327, 602, 904, 597, 864, 757,
    201, 646, 684, 347, 127, 388, 7, 69, 851, 764, 713, 342, 384, 606, 583, 322,
    592, 678, 204, 184, 394, 692, 669, 677, 154, 187, 241, 286, 274, 354, 478, 915,
    691, 833, 105, 215, 460, 829, 476, 109, 904, 664, 230, 5, 80, 74, 550, 575,
    147, 868, 642, 274, 562, 232, 755, 599, 524, 801, 132, 295, 116, 442, 428, 295,
    42, 176, 65, 279, 577, 315, 624, 37, 855, 275, 739, 120, 297, 312, 202, 560,
    321, 233, 756, 760, 573, 108, 519, 781, 534, 129, 425, 681, 553, 422, 716, 763,
    693, 624, 610, 310, 691, 347, 165, 193, 259, 568, 443, 284, 887, 544, 788, 93,
    477, 760, 331, 608, 269, 121, 159, 830, 446, 893, 699, 245, 441, 454, 325, 858,
    131, 847, 764, 169, 361, 575, 922, 525, 176, 586, 640, 321, 536, 742, 677, 742,
    687, 284, 193, 517, 273, 494, 263, 147, 593, 800, 571, 320, 803, 133, 231, 390,
    685, 330, 63, 410, 234, 228, 438, 848, 133, 703, 529, 721, 788, 322, 280, 159,
    738, 586, 388, 684, 445, 680, 245, 595, 614, 233, 812, 32, 284, 658, 745, 229,
    95, 689, 920, 771, 554, 289, 231, 125, 117, 518, 476, 36, 659, 848, 678, 64,
    764, 840, 157, 915, 470, 876, 109, 25, 632, 405, 417, 436, 714, 60, 376, 97,
    413, 706, 446, 21, 3, 773, 569, 267, 272, 213, 31, 560, 231, 758, 103, 271,
    572, 436, 339, 730, 82, 285, 923, 797, 576, 875, 156, 706, 63, 81, 257, 874,
    411, 416, 778, 50, 205, 303, 188, 535, 909, 155, 637, 230, 534, 96, 575, 102,
    264, 233, 919, 593, 865, 26, 579, 623, 766, 146, 10, 739, 246, 127, 71, 244,
    211, 477, 920, 876, 427, 820, 718, 435,
];

pub const M_PDF417_VARIANTS_COUNT: usize = 34;

/// MicroPDF417 symbol variants: data columns, rows, number of error
/// correction codewords and offset into [M_PDF417_COEFFS], one row of 34
/// entries per field.
pub const M_PDF417_VARIANTS: [u16; 4 * M_PDF417_VARIANTS_COUNT] = [
    1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    11, 14, 17, 20, 24, 28, 8, 11, 14, 17, 20, 23, 26, 6, 8, 10, 12,
    15, 20, 26, 32, 38, 44, 4, 6, 8, 10, 12, 15, 20, 26, 32, 38, 44,
    7, 7, 7, 8, 8, 8, 8, 9, 9, 10, 11, 13, 15, 12, 14, 16, 18,
    21, 26, 32, 38, 44, 50, 8, 12, 14, 16, 18, 21, 26, 32, 38, 44, 50,
    0, 0, 0, 7, 7, 7, 7, 15, 15, 24, 34, 57, 84, 45, 70, 99, 115,
    133, 154, 180, 212, 250, 294, 7, 45, 70, 99, 115, 133, 154, 180, 212, 250, 294,
];

/// Row Address Pattern start values per variant: left RAP, centre RAP,
/// right RAP and starting cluster (as a multiple of 3), one row of 34
/// entries per field.
pub const M_PDF417_RAP: [u8; 4 * M_PDF417_VARIANTS_COUNT] = [
    1, 8, 36, 19, 9, 25, 1, 1, 8, 36, 19, 9, 27, 1, 7, 15, 25,
    37, 1, 1, 21, 15, 1, 47, 1, 7, 15, 25, 37, 1, 1, 21, 15, 1,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 7, 15, 25,
    37, 17, 9, 29, 31, 25, 19, 1, 7, 15, 25, 37, 17, 9, 29, 31, 25,
    9, 8, 36, 19, 17, 33, 1, 9, 8, 36, 19, 17, 35, 1, 7, 15, 25,
    37, 33, 17, 37, 47, 49, 43, 1, 7, 15, 25, 37, 33, 17, 37, 47, 49,
    0, 3, 6, 0, 6, 0, 0, 0, 3, 6, 0, 6, 0, 0, 0, 6, 0,
    0, 0, 0, 6, 6, 0, 3, 0, 0, 6, 0, 0, 0, 0, 6, 6, 0,
];

/// Side Row Address Patterns (10 modules each), RAP 1 to 52.
pub const M_PDF417_SIDE: [u16; 52] = [
    0x0322, 0x0362, 0x020A, 0x0212, 0x0214, 0x0216, 0x021A, 0x0222,
    0x0224, 0x0226, 0x0228, 0x022C, 0x022E, 0x0232, 0x0234, 0x0236,
    0x023A, 0x0242, 0x0244, 0x0246, 0x0248, 0x024C, 0x024E, 0x0250,
    0x0258, 0x025C, 0x025E, 0x0262, 0x0264, 0x0266, 0x0268, 0x026C,
    0x026E, 0x0272, 0x0274, 0x0276, 0x027A, 0x0282, 0x0284, 0x0286,
    0x0288, 0x028C, 0x028E, 0x0290, 0x0298, 0x029C, 0x029E, 0x02A0,
    0x02B0, 0x02B8, 0x02BC, 0x02BE,
];

/// Centre Row Address Patterns (10 modules each), RAP 1 to 52.
pub const M_PDF417_CENTER: [u16; 52] = [
    0x02CE, 0x028E, 0x020A, 0x0212, 0x0214, 0x0216, 0x021A, 0x0222,
    0x0224, 0x0226, 0x0228, 0x022C, 0x022E, 0x0232, 0x0234, 0x0236,
    0x023A, 0x0242, 0x0244, 0x0246, 0x0248, 0x024C, 0x024E, 0x0250,
    0x0258, 0x025C, 0x025E, 0x0262, 0x0264, 0x0266, 0x0268, 0x026C,
    0x026E, 0x0272, 0x0274, 0x0276, 0x027A, 0x0282, 0x0284, 0x0286,
    0x0288, 0x028C, 0x0290, 0x0298, 0x029C, 0x029E, 0x02A0, 0x02B0,
    0x02B8, 0x02BC, 0x02BE, 0x02C2,
];

/// Automatic MicroPDF417 sizing: 28 data capacities followed by the
/// matching variant numbers, ordered by total symbol size.
pub const M_PDF417_AUTOSIZE: [u8; 56] = [
    4, 6, 7, 8, 10, 12, 13, 14, 16, 18, 19, 20, 24, 29,
    30, 33, 34, 37, 39, 46, 54, 58, 70, 72, 82, 90, 108, 126,
    1, 14, 2, 7, 3, 25, 8, 16, 5, 17, 9, 6, 10, 11,
    28, 12, 19, 13, 29, 20, 30, 21, 22, 31, 23, 32, 33, 34,
];

/// One of the 34 MicroPDF417 symbol sizes defined by ISO/IEC 24728.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant(u8);

impl Variant {
    /// Creates a Variant from its number (1 to 34).
    pub const fn new(variant: u8) -> Self {
        assert!(variant >= 1 && variant <= 34, "variant must be between 1 and 34");
        Self(variant - 1)
    }

    /// Zero-based index of this variant.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn cols(&self) -> u8 {
        M_PDF417_VARIANTS[self.0 as usize] as u8
    }

    #[inline]
    pub const fn rows(&self) -> u8 {
        M_PDF417_VARIANTS[M_PDF417_VARIANTS_COUNT + self.0 as usize] as u8
    }

    /// Number of error correction codewords in this variant.
    #[inline]
    pub const fn ecc_count(&self) -> usize {
        M_PDF417_VARIANTS[2 * M_PDF417_VARIANTS_COUNT + self.0 as usize] as usize
    }

    /// Offset of the error correction coefficients in [M_PDF417_COEFFS].
    #[inline]
    pub const fn coeff_offset(&self) -> usize {
        M_PDF417_VARIANTS[3 * M_PDF417_VARIANTS_COUNT + self.0 as usize] as usize
    }

    /// Total number of codewords (data and error correction).
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.rows() as usize * self.cols() as usize
    }

    /// Number of codewords available for data.
    #[inline]
    pub const fn data_capacity(&self) -> usize {
        self.capacity() - self.ecc_count()
    }

    /// Width of the symbol in modules.
    pub const fn width(&self) -> u32 {
        let data = self.cols() as u32 * 17;
        let center = if self.cols() >= 3 { 10 } else { 0 };
        10 + data + center + 10 + 1
    }

    /// Finds the smallest variant able to hold `count` data codewords.
    pub fn with_capacity(count: usize) -> Option<Self> {
        let mut found = None;
        let mut i = 28;
        while i > 0 {
            i -= 1;
            if M_PDF417_AUTOSIZE[i] as usize >= count {
                found = Some(Self(M_PDF417_AUTOSIZE[i + 28] - 1));
            } else {
                break;
            }
        }
        found
    }
}

impl From<Variant> for u8 {
    fn from(v: Variant) -> u8 {
        v.0 + 1
    }
}
